fn main() -> anyhow::Result<()> {
    shade_ngin::app::run()
}
