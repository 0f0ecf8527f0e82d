use flow_sender::cli;
use flow_sender::sender;
use flow_sender::utils;

fn main() {
    let (host, port, payload, verbose) = cli::get_args();

    match sender::run(&host, port, &payload) {
        Ok(report) => cli::display_report(&report, verbose),
        Err(err) => {
            utils::print_red(format!("Error: {}", err));
            std::process::exit(1);
        }
    }
}
