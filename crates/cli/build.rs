use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let build = clap::Command::new("build")
        .about("Harvest every listed lesson and render the study book")
        .arg(clap::arg!(--listing_url <URL> "Lesson listing to harvest").value_name("URL"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: output.<format extension>)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (docx, markdown, text)")
                .value_name("FORMAT")
                .default_value("docx")
                .value_parser(["docx", "markdown", "text"]),
        )
        .arg(
            clap::arg!(--cache_dir <DIR> "Directory holding the metadata and text caches")
                .value_name("DIR")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--min_level <N> "Minimum HSK level of vocabulary entries").default_value("4"))
        .arg(clap::arg!(--column_capacity <N> "Vocabulary entries per column").default_value("17"))
        .arg(clap::arg!(--concurrency <N> "Lessons fetched at once").default_value("4"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(clap::arg!(--refresh "Ignore existing caches and overwrite them"));

    let article = clap::Command::new("article")
        .about("Extract the text and vocabulary of a single lesson page")
        .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(clap::arg!(--min_level <N> "Minimum HSK level of vocabulary entries").default_value("4"))
        .arg(clap::arg!(--json "Print the whole collection as JSON"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"));

    let mut cmd = clap::Command::new("beanpress")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Beanpress Contributors")
        .about("Turn annotated Chinese reading lessons into a printable study book")
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .subcommand(build)
        .subcommand(article);

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "beanpress", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "beanpress", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "beanpress", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "beanpress", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
