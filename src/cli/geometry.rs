//! Decode and encode command handlers

use crate::config::Config;
use crate::error::Result;
use crate::geometry::{self, encode_ewkb_hex, encode_ewkt, ByteOrder, GeometryWireValue, Point};
use clap::Args;
use serde::Serialize;

/// Decode command arguments
#[derive(Args)]
pub struct DecodeArgs {
    /// Stored geometry value: `POINT(lng lat)` or hex EWKB
    pub wire: String,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Encode command arguments
#[derive(Args)]
pub struct EncodeArgs {
    /// Longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Emit hex EWKB instead of text
    #[arg(long)]
    pub binary: bool,

    /// Embed a spatial reference id
    #[arg(long)]
    pub srid: Option<u32>,

    /// Big-endian byte order for binary output
    #[arg(long, requires = "binary")]
    pub big_endian: bool,
}

#[derive(Serialize)]
struct DecodeOutput<'a> {
    form: &'a str,
    point: Point,
}

/// Run the decode command
pub fn run_decode(args: DecodeArgs) -> Result<()> {
    let wire = GeometryWireValue::classify(&args.wire);
    let point = geometry::decode(&args.wire)?;

    if args.json {
        let output = DecodeOutput {
            form: wire.form(),
            point,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("form:      {}", wire.form());
        println!("longitude: {}", point.lng());
        println!("latitude:  {}", point.lat());
    }

    Ok(())
}

/// Produce the wire string for an encode request
fn encode_args(args: &EncodeArgs, precision: usize) -> Result<String> {
    let point = Point::new(args.lng, args.lat)?;

    Ok(if args.binary {
        let order = if args.big_endian {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        };
        encode_ewkb_hex(&point, order, args.srid)
    } else if let Some(srid) = args.srid {
        encode_ewkt(&point, srid)
    } else {
        geometry::encode_with_precision(&point, precision)
    })
}

/// Run the encode command
pub fn run_encode(args: EncodeArgs) -> Result<()> {
    let config = Config::load()?;
    println!("{}", encode_args(&args, config.codec.precision)?);
    Ok(())
}
