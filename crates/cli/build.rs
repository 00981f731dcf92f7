use std::{env, fs, path::PathBuf};

use clap::{Arg, ArgAction, Command, value_parser};

fn input() -> Arg {
    Arg::new("input").value_name("INPUT").required(true).help("URL to fetch, local HTML file, or '-' for stdin")
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = Command::new("peloton")
        .version("0.1.0")
        .author("Peloton Contributors")
        .about("Extract cycling race, rider and result tables as JSON")
        .subcommand_required(true)
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .global(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(clap::arg!(--pretty "Pretty-print the JSON output").global(true))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").global(true).default_value("30"))
        .arg(
            Arg::new("user-agent")
                .long("user-agent")
                .value_name("UA")
                .global(true)
                .help("Custom User-Agent for HTTP requests"),
        )
        .arg(
            clap::arg!(--delay <MS> "Delay between consecutive requests in milliseconds")
                .global(true)
                .default_value("1000"),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .subcommand(Command::new("stages").about("Stage list of a stage race overview page").arg(input()))
        .subcommand(Command::new("stage-results").about("Results of one stage of a stage race").arg(input()))
        .subcommand(Command::new("one-day").about("Results of a one-day race").arg(input()))
        .subcommand(Command::new("races").about("Season race calendar").arg(input()))
        .subcommand(Command::new("teams").about("Teams page, grouped by tier").arg(input()))
        .subcommand(Command::new("riders").about("Rider list, e.g. a team roster").arg(input()))
        .subcommand(
            Command::new("rider-year")
                .about("One season of a rider's results")
                .arg(input())
                .arg(clap::arg!(--year <YEAR> "Season the page belongs to").required(true)),
        )
        .subcommand(Command::new("seasons").about("Season years listed on a rider page").arg(input()))
        .subcommand(
            Command::new("career")
                .about("A rider's whole career, fetching every season page")
                .arg(Arg::new("url").value_name("URL").required(true).help("Rider page URL"))
                .arg(
                    Arg::new("by-season")
                        .long("by-season")
                        .action(ArgAction::SetTrue)
                        .help("Report each season separately instead of failing on the first error"),
                ),
        )
        .subcommand(
            Command::new("stage-race")
                .about("Results of every stage of a stage race")
                .arg(Arg::new("url").value_name("URL").required(true).help("Stage race overview page URL"))
                .arg(
                    Arg::new("by-stage")
                        .long("by-stage")
                        .action(ArgAction::SetTrue)
                        .help("Report each stage separately instead of failing on the first error"),
                ),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "peloton", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "peloton", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "peloton", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "peloton", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
