fn main() {
    if let Err(err) = flowspine::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
