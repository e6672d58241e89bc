fn main() -> anyhow::Result<()> {
    focussessions_lib::run()
}
