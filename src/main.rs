use abi_codec::abi::{decode, AbiEncoder, AbiFunction, AbiSelector, AbiType, AbiValue};
use abi_codec::config::CodecConfig;
use abi_codec::error::AbiResult;
use abi_codec::utils::crypto::{decode_hex, encode_hex};
use clap::{Parser, Subcommand};
use std::error::Error;

#[derive(Parser)]
#[command(name = "abi-codec", version, about = "Ethereum contract ABI encoder/decoder")]
struct Cli {
    /// Emit debug log records on stderr
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the 4-byte selector of a function signature
    Selector {
        /// e.g. "transfer(address,uint256)"
        signature: String,
    },
    /// Print the 32-byte topic of an event signature
    Topic {
        /// e.g. "Transfer(address,address,uint256)"
        signature: String,
    },
    /// Encode call data from a signature and a JSON array of arguments
    Encode {
        signature: String,
        /// JSON array, e.g. '["0x...", "1000"]'
        #[arg(value_name = "JSON")]
        args: String,
        /// Print only the encoded arguments
        #[arg(long)]
        no_selector: bool,
    },
    /// Decode hex data as a comma-separated type list, printing JSON
    Decode {
        /// e.g. "address,uint256,bool"
        types: String,
        #[arg(value_name = "0xHEX")]
        data: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    CodecConfig::default()
        .with_debug_logging(cli.debug)
        .apply_logging();

    match run(cli.cmd) {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(err) => {
            let report = serde_json::json!({
                "error": err.code(),
                "message": err.to_string(),
            });
            eprintln!("{}", report);
            std::process::exit(1);
        }
    }
}

fn run(cmd: Command) -> AbiResult<String> {
    match cmd {
        Command::Selector { signature } => {
            let function = AbiFunction::from_signature(&signature)?;
            Ok(encode_hex(&function.selector()?))
        }
        Command::Topic { signature } => {
            let function = AbiFunction::from_signature(&signature)?;
            Ok(encode_hex(&AbiSelector::topic_from_signature(&function.signature()?)))
        }
        Command::Encode {
            signature,
            args,
            no_selector,
        } => {
            let function = AbiFunction::from_signature(&signature)?;
            let json: serde_json::Value = serde_json::from_str(&args)?;
            let values = AbiValue::list_from_json(&function.input_types()?, &json)?;
            let encoded = if no_selector {
                AbiEncoder::encode_sequence(&values)
            } else {
                function.encode_input(&values)?
            };
            Ok(encode_hex(&encoded))
        }
        Command::Decode { types, data } => {
            let types = AbiType::parse_list(&types)?;
            let values = decode(&types, &decode_hex(&data)?)?;
            let rendered: Vec<_> = values.iter().map(|v| v.to_json()).collect();
            Ok(serde_json::Value::Array(rendered).to_string())
        }
    }
}
