use clap::Parser;

/// This is a standings program for multi-stage rally events.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the event and its sheets.
    /// For more information about the file format, read the documentation of the
    /// `rally_standings::manual` module.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The stage list (PE, Desde, Hasta, KMS, HORA). Overrides the
    /// stage sheet of the configuration. Files ending in .xlsx are read as
    /// Excel workbooks, anything else as CSV.
    #[clap(long, value_parser)]
    pub stages: Option<String>,

    /// (file path) The results sheet (Nombre, Categoria, SS1..SSn, Penalizacion).
    #[clap(long, value_parser)]
    pub results: Option<String>,

    /// (file path, optional) The roster of the registered entrants.
    #[clap(long, value_parser)]
    pub roster: Option<String>,

    /// (file path, optional) The start order, with one start time per stage.
    #[clap(long, value_parser)]
    pub schedule: Option<String>,

    /// (stage number) If specified, only the classifications after this stage
    /// are computed.
    #[clap(long, value_parser)]
    pub stage: Option<u32>,

    /// (file path, 'stdout' or empty) If specified, the summary of the event will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the summary of an event in JSON format. If provided, rallytab will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (seconds) If specified, the sheets are read again at this interval and the summary is
    /// rewritten after every read, until the program is stopped.
    #[clap(short, long, value_parser)]
    pub watch: Option<u64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
