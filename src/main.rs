use cooc_counter::{Config, Pipeline};

use std::env;
use std::process;
use log::{error, info};

fn main() {

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("building parameters...");
    let args: Vec<String> = env::args().collect();
    let params = match Config::new(&args) {
        Ok(params) => params,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = Pipeline::run(&params) {
        error!("{}", e);
        process::exit(1);
    }
}
