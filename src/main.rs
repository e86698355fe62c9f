fn main() -> anyhow::Result<()> {
    campaign_lib::run()
}
