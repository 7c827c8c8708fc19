use clap::Parser;

/// An interactive shell for driving lights through a simulated bridge.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct ShellArgs {
    /// JSON file describing the simulated lights, keyed by light id.
    #[clap(short, long)]
    pub fixtures: String,

    /// JSON file with the mode switch configuration.
    /// Without it every light joins one cycle group and both white presets.
    #[clap(short, long)]
    pub mode_config: Option<String>,

    /// API key reported in the discovery plan.
    #[clap(short, long, default_value = "huelight-shell")]
    pub username: String,
}
