use clap::Parser;
use railcast::{app::RailcastApp, RailcastError};

fn main() -> Result<(), RailcastError> {
    env_logger::init();
    let args = RailcastApp::parse();
    args.op.run().inspect_err(|e| log::error!("{e}"))
}
