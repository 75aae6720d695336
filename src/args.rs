use clap::Parser;

/// This is a vote tally program for forum quests.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the quest description, in JSON format.
    /// The posts source and the options of the tally are read from this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the summary of a tally in JSON format. If provided, ftally will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the tally will be written in JSON format to the given
    /// location. Otherwise it is printed on the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The dump of the posts of the thread. Setting this option overrides the posts source
    /// that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (json or xlsx) The type of the input. By default, it is guessed from the extension of the input file.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: the only worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (irv, baldwin, coombs, wilson or rirv) Overrides the ranked vote counting method of the quest.
    #[clap(short, long, value_parser)]
    pub method: Option<String>,

    /// (none, line, linetask, block or blockall) Overrides the partition mode of the quest.
    #[clap(short, long, value_parser)]
    pub partition: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
