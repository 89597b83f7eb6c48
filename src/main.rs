fn main() {
    if let Err(e) = deedverify_lib::run() {
        eprintln!("deedverify: {e}");
        std::process::exit(1);
    }
}
