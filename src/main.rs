fn main() {
    if let Err(e) = gazefocus_lib::run() {
        eprintln!("gazefocus: {e}");
        std::process::exit(1);
    }
}
