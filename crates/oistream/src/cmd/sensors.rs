use oistream_frame::SensorRegistry;

use crate::cmd::SensorsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_registry, OutputFormat};

pub fn run(_args: SensorsArgs, format: OutputFormat) -> CliResult<i32> {
    print_registry(&SensorRegistry::open_interface(), format);
    Ok(SUCCESS)
}
