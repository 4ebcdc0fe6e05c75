use clap::{Arg, ArgMatches, arg};
use tempora_lib::{DateInterval, Interval};

pub struct GlobalSettings {
    // Whether intervals are read and shown as ranges of days, where the end
    // date is included
    pub dates: bool,

    // Separator between columns in tables
    pub colsep: String,
}

impl GlobalSettings {
    /// Return the command line switches to configure the global settings
    pub fn cli() -> impl IntoIterator<Item = Arg> {
        [
            arg!(--dates "Intervals are ranges of days, with inclusive end")
                .global(true),
            arg!(--colsep [SEP] "Separator between columns")
                .default_value(" | ")
                .global(true),
        ]
    }

    /// Create the settings from the command line arguments
    pub fn new(args: &ArgMatches) -> Self {
        GlobalSettings {
            dates: args.get_flag("dates"),
            colsep: args
                .get_one::<String>("colsep")
                .cloned()
                .unwrap_or_else(|| " | ".to_string()),
        }
    }

    /// How an interval is displayed to the user
    pub fn show(&self, interval: &Interval) -> String {
        if self.dates {
            DateInterval::covering(interval).to_string()
        } else {
            interval.to_string()
        }
    }
}

impl Default for GlobalSettings {
    fn default() -> Self {
        GlobalSettings {
            dates: false,
            colsep: " | ".to_string(),
        }
    }
}
