use orrery::{flow, solar_system};

fn main() -> anyhow::Result<()> {
    flow::run(flow::Config::default(), vec![solar_system::constructor()])
}
