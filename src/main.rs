fn main() {
    #[cfg(feature = "cli")]
    postpack::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("postpack: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
