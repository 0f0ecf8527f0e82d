use std::env;

use crate::sender::SendReport;

pub fn print_usage() {
    println!("Usage: flow_sender <host> <port> [payload] [OPTIONS]");
    println!("Options:");
    println!("  -v, --verbose    Display resolution details and label placement");
    println!("  -h, --help       Display this help message");
    println!("\nSends one UDP datagram to an IPv6 destination and reports the");
    println!("20-bit flow label assigned to the traffic. The payload defaults");
    println!("to 'NASA' when none is given.");
}

pub fn get_args() -> (String, u16, Vec<u8>, bool) {
    let args: Vec<String> = env::args().collect();

    // If exactly one argument and it's a help flag, show usage
    if args.len() == 2 && (args[1] == "--help" || args[1] == "-h") {
        print_usage();
        std::process::exit(0);
    }

    if args.len() < 3 || args.len() > 5 {
        eprintln!("Error: Invalid number of arguments");
        print_usage();
        std::process::exit(1);
    }

    if args[1].starts_with('-') {
        eprintln!("Error: First argument must be a host, not a flag");
        print_usage();
        std::process::exit(1);
    }

    let host = args[1].clone();

    let port = match args[2].parse::<u16>() {
        Ok(port) => port,
        Err(_) => {
            eprintln!("Error: Port must be a number between 0 and 65535");
            print_usage();
            std::process::exit(1);
        }
    };

    let mut payload: Vec<u8> = crate::flow_consts::DEFAULT_PAYLOAD.to_vec();
    let mut verbose = false;

    for arg in &args[3..] {
        if arg == "-v" || arg == "--verbose" {
            verbose = true;
        } else if arg == "-h" || arg == "--help" {
            eprintln!("Error: Help flag must be used alone");
            print_usage();
            std::process::exit(1);
        } else if arg.starts_with('-') {
            eprintln!("Error: Unknown flag: {}", arg);
            print_usage();
            std::process::exit(1);
        } else {
            payload = arg.clone().into_bytes();
        }
    }

    (host, port, payload, verbose)
}

pub fn display_report(report: &SendReport, verbose: bool) {
    crate::utils::print_green(format!("Flow Label: {:#x}", report.flow_label));
    println!("Sent {} bytes to {}", report.bytes_sent, report.address);

    if verbose {
        crate::utils::print_yellow(format!(
            "Scope id: {}",
            report.address.scope_id()
        ));
        let pinned = if report.label_pinned {
            "yes (kernel flow label manager)"
        } else {
            "no (derived only, sent unlabeled)"
        };
        crate::utils::print_yellow(format!("Label pinned to socket: {}", pinned));
    }
}
