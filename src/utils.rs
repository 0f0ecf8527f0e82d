use std::fs;
use std::net::Ipv6Addr;

// Optional tuning file. A missing file or key is the normal case and means
// the compiled defaults apply.
const CONFIG_FILE: &str = ".flowsender.yaml";

fn read_config_file() -> Option<String> {
    fs::read_to_string(CONFIG_FILE).ok()
}

fn find_key_value(content: &str, key: &str) -> Option<String> {
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.is_empty() {
            continue;
        }

        if let Some((k, v)) = line.split_once(':') {
            if k.trim() == key {
                return Some(v.trim().to_string());
            }
        }
    }

    None
}

pub fn get_config_string(key: &str) -> Option<String> {
    let content = read_config_file()?;
    find_key_value(&content, key)
}

pub fn get_config_int(key: &str) -> Option<u64> {
    get_config_string(key)?.parse::<u64>().ok()
}

pub fn get_config_ipv6(key: &str) -> Option<Ipv6Addr> {
    get_config_string(key)?.parse::<Ipv6Addr>().ok()
}

pub fn print_green(input_text: String) {
    println!("\x1b[92m{}\x1b[0m", input_text);
}

pub fn print_yellow(input_text: String) {
    println!("\x1b[93m{}\x1b[0m", input_text);
}

pub fn print_red(input_text: String) {
    println!("\x1b[91m{}\x1b[0m", input_text);
}
