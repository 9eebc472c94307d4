use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("aeo-audit")
        .version("0.1.0")
        .about("Audit how ready a web page is to be cited by AI answer engines")
        .arg(clap::arg!(<INPUT> "URL to audit, local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Report format (text, json, markdown)")
                .value_name("FORMAT")
                .default_value("text")
                .value_parser(["text", "txt", "json", "markdown", "md"]),
        )
        .arg(clap::arg!(--url <URL> "Page URL to record when reading a file or stdin"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("10"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(clap::arg!(--window <WORDS> "Words in the leading content window").default_value("500"))
        .arg(clap::arg!(--openai_key <KEY> "OpenAI API key for query generation and recommendations"))
        .arg(clap::arg!(--perplexity_key <KEY> "Perplexity API key for citation checks"))
        .arg(clap::arg!(--check_citations "Check whether answer engines cite the page"))
        .arg(clap::arg!(--recommend "Ask for improvement recommendations"))
        .arg(clap::arg!(--preview "Include the leading content window in the report"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "aeo-audit", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "aeo-audit", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "aeo-audit", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "aeo-audit", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
