//! Example turning a binary schema dictionary into live types.
//!
//! Run with: `cargo run --example generate`
//!
//! Parses an inline dictionary, prints the generated Rust source, then
//! materializes the types into a catalog and round-trips an extension
//! object through the binary codec.

use bytes::BytesMut;
use uaforge::core::{ExtensionBody, ExtensionObject, StructValue, Value};
use uaforge::{NodeId, TypeCatalog, TypeModel, decode_extension_object, encode_extension_object};

const DICTIONARY: &str = r#"
<opc:TypeDictionary xmlns:opc="http://opcfoundation.org/BinarySchema/">
  <opc:EnumeratedType Name="SensorKind" LengthInBits="32">
    <opc:EnumeratedValue Name="Temperature" Value="0"/>
    <opc:EnumeratedValue Name="Pressure" Value="1"/>
  </opc:EnumeratedType>
  <opc:StructuredType Name="SensorReport">
    <opc:Field Name="Kind" TypeName="tns:SensorKind"/>
    <opc:Field Name="Serial" TypeName="opc:String"/>
    <opc:Field Name="NoOfSamples" TypeName="opc:Int32"/>
    <opc:Field Name="Samples" TypeName="opc:Double"/>
  </opc:StructuredType>
</opc:TypeDictionary>
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Emit the Rust source a build step would persist
    let source = uaforge::codegen::generate_from_xml(DICTIONARY)?;
    println!("Generated source:\n{source}");

    // Materialize the same dictionary into a live catalog
    let catalog = TypeCatalog::new();
    let model = TypeModel::from_xml(DICTIONARY)?;
    let names = uaforge::codegen::materialize(&model, &catalog)?;
    println!("Materialized types: {names:?}");

    let type_id: NodeId = "ns=2;i=6101".parse()?;
    catalog.bind_identifier("SensorReport", type_id.clone());

    // Build a value and push it through the wire codec
    let descriptor = catalog
        .get("SensorReport")
        .and_then(|t| t.as_struct().cloned())
        .ok_or("SensorReport not materialized")?;

    let mut report = StructValue::new(descriptor);
    report.set("Kind", Value::Enum(1));
    report.set("Serial", Value::String("A-1042".to_string()));
    report.set(
        "Samples",
        Value::Array(vec![Value::Double(101.3), Value::Double(99.8)]),
    );

    let object = ExtensionObject {
        type_id,
        body: ExtensionBody::Decoded(report),
    };

    let mut buf = BytesMut::new();
    encode_extension_object(&object, &catalog, &mut buf)?;
    println!("Encoded {} bytes", buf.len());

    let mut input = &buf[..];
    let decoded = decode_extension_object(&catalog, &mut input)?;
    if let ExtensionBody::Decoded(report) = &decoded.body {
        println!("Decoded {}: serial = {:?}", report.type_name(), report.get("Serial"));
    }

    Ok(())
}
