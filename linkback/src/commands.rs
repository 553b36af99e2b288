use crate::CLAP_STYLING;
use clap::arg;
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("linkback")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("linkback")
        .styles(CLAP_STYLING)
        .about("Checks that the friend links declared on your blog link back to you")
        .arg(
            arg!(-f --"file" <PATH>)
                .required(false)
                .help("Path to the YAML file declaring your friend links")
                .default_value("links.yaml"),
        )
        .arg(
            arg!(-u --"url" <URL>)
                .required(true)
                .help("Your blog URL, the backlink target")
                .value_parser(clap::value_parser!(Url)),
        )
        .arg(
            arg!(--"old-url" <URL>)
                .required(false)
                .help("A previous blog URL that still counts as a backlink")
                .value_parser(clap::value_parser!(Url)),
        )
        .arg(
            arg!(-c --"concurrency" <NUM>)
                .required(false)
                .help("How many sites to check at once")
                .value_parser(clap::value_parser!(usize))
                .default_value("5"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Where to write the report file")
                .value_parser(clap::value_parser!(std::path::PathBuf))
                .default_value("backlink_report.md"),
        )
        .arg(
            arg!(--"format" <FORMAT>)
                .required(false)
                .help("Report file format")
                .value_parser(["markdown", "md", "json"])
                .default_value("markdown"),
        )
        .arg(arg!(-q --"quiet" "Suppress banner and progress output").required(false))
}
