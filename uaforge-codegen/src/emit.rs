//! Rust source emission for modeled types.
//!
//! Emission produces a readable artifact of what the pipeline materialized:
//! plain Rust definitions mirroring the live descriptors, written to disk
//! for inspection or vendoring. The running system never compiles this
//! output, it interprets the descriptors directly.

use tracing::info;
use uaforge_core::BuiltinType;
use uaforge_schema::{DefaultValue, EnumType, Field, FieldType, ModelEntry, Struct, TypeModel};

/// Emitter for Rust definitions of one type model.
pub struct CodeEmitter<'a> {
    model: &'a TypeModel,
}

impl<'a> CodeEmitter<'a> {
    /// Creates a new emitter.
    #[must_use]
    pub fn new(model: &'a TypeModel) -> Self {
        Self { model }
    }

    /// Emits the whole model as one module, header included.
    #[must_use]
    pub fn emit_module(&self) -> String {
        let mut output = String::new();
        output.push_str("//! Generated type definitions. Do not edit.\n\n");
        output.push_str("#![allow(dead_code)]\n\n");
        output.push_str(
            "use uaforge_core::{\n    Error, ExtensionObject, Guid, LocalizedText, NodeId, \
             QualifiedName, TypeCatalog, Value, ua_epoch,\n};\n\n",
        );

        for entry in self.model.iter() {
            match entry {
                ModelEntry::Enum(e) => output.push_str(&self.emit_enum(e)),
                ModelEntry::Struct(s) => output.push_str(&self.emit_struct(s)),
            }
        }

        output.push_str(&self.emit_registration());
        output
    }

    /// Emits one enum definition with its `Default` impl.
    #[must_use]
    pub fn emit_enum(&self, e: &EnumType) -> String {
        let mut output = String::new();

        output.push_str(&format!("/// {} enumeration.\n", e.name));
        output.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]\n");
        output.push_str("#[repr(i32)]\n");
        output.push_str(&format!("pub enum {} {{\n", e.name));
        for member in &e.members {
            output.push_str(&format!("    {} = {},\n", member.name, member.value));
        }
        output.push_str("}\n\n");

        if let Some(first) = e.members.first() {
            output.push_str(&format!("impl Default for {} {{\n", e.name));
            output.push_str("    fn default() -> Self {\n");
            output.push_str(&format!("        Self::{}\n", first.name));
            output.push_str("    }\n");
            output.push_str("}\n\n");
        }

        output
    }

    /// Emits one struct definition with its `Default` impl.
    ///
    /// Mask-guarded structs carry a leading `encoding` mask field, matching
    /// the wire layout the codec produces.
    #[must_use]
    pub fn emit_struct(&self, s: &Struct) -> String {
        let mut output = String::new();
        let masked = s.option_count() > 0;

        output.push_str(&format!("/// {} structure.\n", s.name));
        output.push_str("#[derive(Debug, Clone, PartialEq)]\n");
        output.push_str(&format!("pub struct {} {{\n", s.name));
        if masked {
            output.push_str("    pub encoding: u32,\n");
        }
        for field in &s.fields {
            output.push_str(&format!(
                "    pub {}: {},\n",
                to_snake_case(&field.name),
                field_rust_type(field)
            ));
        }
        output.push_str("}\n\n");

        output.push_str(&format!("impl Default for {} {{\n", s.name));
        output.push_str("    fn default() -> Self {\n");
        output.push_str("        Self {\n");
        if masked {
            output.push_str("            encoding: 0,\n");
        }
        for field in &s.fields {
            output.push_str(&format!(
                "            {}: {},\n",
                to_snake_case(&field.name),
                self.field_default_expr(field)
            ));
        }
        output.push_str("        }\n");
        output.push_str("    }\n");
        output.push_str("}\n\n");

        output
    }

    /// Emits the function binding encoding identifiers into a catalog.
    ///
    /// Empty when no structure carries an identifier, so artifacts saved
    /// before binding stay free of dead registration code.
    fn emit_registration(&self) -> String {
        let bound: Vec<&Struct> = self
            .model
            .iter()
            .filter_map(|entry| match entry {
                ModelEntry::Struct(s) if s.type_id.is_some() => Some(s),
                _ => None,
            })
            .collect();
        if bound.is_empty() {
            return String::new();
        }

        let mut output = String::new();
        output.push_str("/// Binds the encoding node identifiers of these types.\n");
        output.push_str(
            "pub fn register_encoding_ids(catalog: &TypeCatalog) -> Result<(), Error> {\n",
        );
        for s in bound {
            if let Some(type_id) = &s.type_id {
                output.push_str(&format!(
                    "    catalog.bind_identifier(\"{}\", \"{}\".parse()?);\n",
                    s.name, type_id
                ));
            }
        }
        output.push_str("    Ok(())\n");
        output.push_str("}\n");
        output
    }

    fn field_default_expr(&self, field: &Field) -> String {
        match field.default_value() {
            DefaultValue::None => "None".to_string(),
            DefaultValue::EmptyArray => {
                if is_char_array(field) {
                    "String::new()".to_string()
                } else {
                    "Vec::new()".to_string()
                }
            }
            DefaultValue::Builtin(b) => b.default_expr().to_string(),
            DefaultValue::EnumFirst(name) => match self.model.get(&name) {
                Some(ModelEntry::Enum(e)) => match e.members.first() {
                    Some(first) => format!("{}::{}", name, first.name),
                    None => format!("{name}::default()"),
                },
                _ => format!("{name}::default()"),
            },
            DefaultValue::StructNew(name) => format!("{name}::default()"),
        }
    }
}

/// Returns the Rust type rendered for one field.
fn field_rust_type(field: &Field) -> String {
    let scalar = match &field.field_type {
        FieldType::Builtin(b) => b.rust_type().to_string(),
        FieldType::Enum(name) | FieldType::Struct(name) => name.clone(),
    };
    if field.is_array {
        // Char sequences are text, not byte vectors.
        if is_char_array(field) {
            "String".to_string()
        } else {
            format!("Vec<{scalar}>")
        }
    } else if field.is_optional {
        format!("Option<{scalar}>")
    } else {
        scalar
    }
}

fn is_char_array(field: &Field) -> bool {
    field.is_array && field.field_type == FieldType::Builtin(BuiltinType::Char)
}

/// Converts a sanitized identifier to snake case.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let mut output = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_uppercase() {
            if prev_lower {
                output.push('_');
            }
            output.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            output.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    output
}

/// Emits a model and writes the module to a file.
///
/// # Errors
/// Returns an IO error if the file cannot be written.
pub fn save_to_file(
    model: &TypeModel,
    path: impl AsRef<std::path::Path>,
) -> std::io::Result<()> {
    let path = path.as_ref();
    let source = CodeEmitter::new(model).emit_module();
    std::fs::write(path, &source)?;
    info!(path = %path.display(), types = model.len(), "wrote generated definitions");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uaforge_core::NodeId;

    fn sample_model() -> TypeModel {
        let xml = r#"<Dict>
            <EnumeratedType Name="Mode">
                <EnumeratedValue Name="Auto" Value="0"/>
                <EnumeratedValue Name="Manual" Value="1"/>
            </EnumeratedType>
            <StructuredType Name="DeviceInfo">
                <Field Name="SerialNumber" TypeName="opc:UInt32"/>
                <Field Name="OperatingMode" TypeName="tns:Mode"/>
                <Field Name="NoOfReadings" TypeName="opc:Int32"/>
                <Field Name="Readings" TypeName="opc:Double"/>
                <Field Name="NickName" TypeName="opc:String" SwitchField="NickNameSpecified"/>
            </StructuredType>
        </Dict>"#;
        TypeModel::from_xml(xml).expect("model")
    }

    #[test]
    fn test_emit_enum() {
        let model = sample_model();
        let emitter = CodeEmitter::new(&model);
        let Some(ModelEntry::Enum(e)) = model.get("Mode") else {
            panic!("missing enum");
        };
        let out = emitter.emit_enum(e);
        assert!(out.contains("pub enum Mode {"));
        assert!(out.contains("Auto = 0,"));
        assert!(out.contains("Manual = 1,"));
        assert!(out.contains("Self::Auto"));
    }

    #[test]
    fn test_emit_struct_with_mask() {
        let model = sample_model();
        let emitter = CodeEmitter::new(&model);
        let Some(ModelEntry::Struct(s)) = model.get("DeviceInfo") else {
            panic!("missing struct");
        };
        let out = emitter.emit_struct(s);

        // Mask field leads the definition, matching wire order.
        let encoding_at = out.find("pub encoding: u32,").expect("mask field");
        let serial_at = out.find("pub serial_number: u32,").expect("first field");
        assert!(encoding_at < serial_at);

        assert!(out.contains("pub operating_mode: Mode,"));
        assert!(out.contains("pub readings: Vec<f64>,"));
        assert!(out.contains("pub nick_name: Option<String>,"));
        assert!(out.contains("operating_mode: Mode::Auto,"));
        assert!(out.contains("nick_name: None,"));
    }

    #[test]
    fn test_no_mask_without_optionals() {
        let model = TypeModel::from_xml(
            r#"<Dict>
                <StructuredType Name="Point">
                    <Field Name="X" TypeName="opc:Double"/>
                    <Field Name="Y" TypeName="opc:Double"/>
                </StructuredType>
            </Dict>"#,
        )
        .expect("model");
        let emitter = CodeEmitter::new(&model);
        let Some(ModelEntry::Struct(s)) = model.get("Point") else {
            panic!("missing struct");
        };
        let out = emitter.emit_struct(s);
        assert!(!out.contains("pub encoding"));
    }

    #[test]
    fn test_char_array_is_text() {
        let model = TypeModel::from_xml(
            r#"<Dict>
                <StructuredType Name="Tag">
                    <Field Name="NoOfText" TypeName="opc:Int32"/>
                    <Field Name="Text" TypeName="opc:Char"/>
                </StructuredType>
            </Dict>"#,
        )
        .expect("model");
        let emitter = CodeEmitter::new(&model);
        let Some(ModelEntry::Struct(s)) = model.get("Tag") else {
            panic!("missing struct");
        };
        let out = emitter.emit_struct(s);
        assert!(out.contains("pub text: String,"));
    }

    #[test]
    fn test_registration_binds_known_ids() {
        let mut model = sample_model();
        let id: NodeId = "ns=3;i=99".parse().expect("node id");
        assert!(model.set_typeid("DeviceInfo", id));
        let out = CodeEmitter::new(&model).emit_module();
        assert!(out.contains("catalog.bind_identifier(\"DeviceInfo\", \"ns=3;i=99\".parse()?);"));
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("SerialNumber"), "serial_number");
        assert_eq!(to_snake_case("URL"), "url");
        assert_eq!(to_snake_case("XAxis"), "xaxis");
        assert_eq!(to_snake_case("Value2"), "value2");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }
}
