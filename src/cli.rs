fn main() -> anyhow::Result<()> {
    scopecal::Cli::run()
}
