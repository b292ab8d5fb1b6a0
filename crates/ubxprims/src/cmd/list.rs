use ubxprims::catalog;

use crate::cmd::ListArgs;
use crate::exit::{message_error, CliResult, SUCCESS};
use crate::output::{print_catalog, OutputFormat, SchemaEntry};

pub fn run(args: ListArgs, format: OutputFormat) -> CliResult<i32> {
    let mut schemas = Vec::new();
    if !args.poll || args.all {
        schemas.extend(catalog::output_schemas().map_err(|err| message_error("catalog failed", err))?);
    }
    if args.poll || args.all {
        schemas.extend(catalog::poll_schemas().map_err(|err| message_error("catalog failed", err))?);
    }
    schemas.sort_by_key(|schema| (schema.id(), schema.is_poll()));

    let entries: Vec<SchemaEntry> = schemas.iter().map(|schema| SchemaEntry::new(schema)).collect();
    print_catalog(&entries, format);
    Ok(SUCCESS)
}
