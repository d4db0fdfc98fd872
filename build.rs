// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn patterns_arg() -> Arg {
    Arg::new("patterns")
        .num_args(0..)
        .value_name("PACKAGE-WILDCARD")
        .help("Package wildcards")
}

fn build_cli() -> Command {
    Command::new("versionlock")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Versionlock Contributors")
        .about("Control package version locks")
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .global(true)
                .help("Configuration file (default: /etc/versionlock/versionlock.toml)"),
        )
        .arg(
            Arg::new("locklist")
                .short('l')
                .long("locklist")
                .global(true)
                .help("Lock list path or URL, overrides the configuration"),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .global(true)
                .default_value("/var/lib/versionlock/catalog.db")
                .help("Catalog database path"),
        )
        .arg(
            Arg::new("follow_obsoletes")
                .long("follow-obsoletes")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Also hold back packages obsoleting a locked one"),
        )
        .arg(
            Arg::new("no_hint")
                .long("no-hint")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Do not log how many updates are held back"),
        )
        .subcommand(
            Command::new("add")
                .about("Lock packages to their installed (or else available) version")
                .arg(patterns_arg()),
        )
        .subcommand(
            Command::new("exclude")
                .about("Exclude the newest available version of packages")
                .aliases(["add-!", "add!", "blacklist"])
                .arg(patterns_arg()),
        )
        .subcommand(Command::new("list").about("List the lock list entries"))
        .subcommand(Command::new("status").about("Show updates held back by the locks"))
        .subcommand(
            Command::new("delete")
                .about("Delete matching entries")
                .alias("del")
                .arg(patterns_arg()),
        )
        .subcommand(Command::new("clear").about("Remove every entry"))
        .subcommand(Command::new("excludes").about("Print the exclusion sets as JSON"))
        .subcommand(
            Command::new("import-catalog")
                .about("Load a JSON catalog snapshot into the catalog database")
                .arg(Arg::new("snapshot").required(true).help("Snapshot file")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(Arg::new("shell").required(true).help("Shell to generate completions for")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("versionlock.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
