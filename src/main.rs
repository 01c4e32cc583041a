fn main() {
    if let Err(err) = partition_chart::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
