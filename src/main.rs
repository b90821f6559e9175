fn main() {
    if let Err(e) = nuscenes_osm::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
