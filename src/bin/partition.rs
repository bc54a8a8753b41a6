use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    quotasplit::apps::run_partition_app(std::env::args().skip(1))
}
