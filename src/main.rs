use anyhow::Result;

fn main() -> Result<()> {
    session_replay::cli::run()
}
