fn main() -> anyhow::Result<()> {
    rr_stats_lib::run()
}
