// src/utils/decode.rs

//! Structured payload decoding: zip bundles, XML and JSON record dumps.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::Value;
use zip::ZipArchive;

use crate::error::{AppError, Result};
use crate::models::DatasetFormat;

/// One flat record: field name → text value.
pub type Fields = HashMap<String, String>;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decoded body, ready for record extraction.
#[derive(Debug, PartialEq, Eq)]
pub enum Payload {
    Xml(Vec<u8>),
    Json(Vec<u8>),
}

/// Unpack a zip bundle or sniff a raw XML/JSON body.
///
/// `hint` is the format the dataset is published in. Inside a bundle it
/// picks which member type is preferred; for a raw body it is used only
/// when the content itself gives no clue.
pub fn unpack(bytes: Vec<u8>, hint: Option<DatasetFormat>) -> Result<Payload> {
    if bytes.starts_with(ZIP_MAGIC) {
        return unzip(bytes, hint);
    }

    let sniffed = sniff(&bytes);
    if let (Some(found), Some(expected)) = (sniffed, hint) {
        if found != expected {
            log::warn!("Payload looks like {found:?}, dataset says {expected:?}");
        }
    }
    match sniffed.or(hint) {
        Some(DatasetFormat::Xml) => Ok(Payload::Xml(bytes)),
        Some(DatasetFormat::Json) => Ok(Payload::Json(bytes)),
        None => Err(AppError::decode("payload", "neither zip, XML nor JSON")),
    }
}

fn sniff(bytes: &[u8]) -> Option<DatasetFormat> {
    match without_bom(bytes).iter().copied().find(|b| !b.is_ascii_whitespace())? {
        b'<' => Some(DatasetFormat::Xml),
        b'[' | b'{' => Some(DatasetFormat::Json),
        _ => None,
    }
}

fn without_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

fn unzip(bytes: Vec<u8>, hint: Option<DatasetFormat>) -> Result<Payload> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let names: Vec<String> = archive.file_names().map(String::from).collect();
    log::debug!("Archive holds {} members", names.len());

    let pick = |ext: &str| {
        names
            .iter()
            .filter(|n| !n.ends_with('/'))
            .find(|n| n.to_lowercase().ends_with(ext))
            .cloned()
    };
    let order = match hint {
        Some(DatasetFormat::Json) => [DatasetFormat::Json, DatasetFormat::Xml],
        _ => [DatasetFormat::Xml, DatasetFormat::Json],
    };

    let (name, format) = order
        .into_iter()
        .find_map(|format| {
            let ext = match format {
                DatasetFormat::Xml => ".xml",
                DatasetFormat::Json => ".json",
            };
            pick(ext).map(|name| (name, format))
        })
        .ok_or_else(|| AppError::decode("archive", "no .xml or .json member"))?;

    let mut member = archive.by_name(&name)?;
    let mut out = Vec::with_capacity(member.size() as usize);
    member.read_to_end(&mut out)?;
    log::info!("Extracted {} ({} bytes)", name, out.len());

    Ok(match format {
        DatasetFormat::Xml => Payload::Xml(out),
        DatasetFormat::Json => Payload::Json(out),
    })
}

/// Records of any supported payload.
pub fn records(
    bytes: Vec<u8>,
    record_tag: &str,
    hint: Option<DatasetFormat>,
) -> Result<Vec<Fields>> {
    match unpack(bytes, hint)? {
        Payload::Xml(xml) => xml_records(&xml, record_tag),
        Payload::Json(json) => json_records(&json),
    }
}

/// Records of an XML dump.
///
/// Each `record_tag` element is one record; its own attributes, the
/// attributes of every descendant and the text of every descendant become
/// fields (first occurrence of a name wins). Without any `record_tag`
/// element, the children of the root element are used instead.
pub fn xml_records(xml: &[u8], record_tag: &str) -> Result<Vec<Fields>> {
    let xml = without_bom(xml);
    let tagged = read_xml(xml, |name, _| name == record_tag)?;
    if !tagged.is_empty() {
        return Ok(tagged);
    }
    read_xml(xml, |_, depth| depth == 1)
}

fn read_xml(xml: &[u8], is_record: impl Fn(&str, usize) -> bool) -> Result<Vec<Fields>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut current: Option<Fields> = None;
    let mut open: Vec<String> = Vec::new();
    let mut depth = 0usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = local_name(&e);
                if current.is_none() && is_record(&name, depth) {
                    current = Some(Fields::new());
                    open.clear();
                }
                if let Some(fields) = current.as_mut() {
                    collect_attributes(&e, fields)?;
                    open.push(name);
                }
                depth += 1;
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                match current.as_mut() {
                    Some(fields) => collect_attributes(&e, fields)?,
                    None if is_record(&name, depth) => {
                        let mut fields = Fields::new();
                        collect_attributes(&e, &mut fields)?;
                        records.push(fields);
                    }
                    None => {}
                }
            }
            Event::Text(t) => {
                if let (Some(fields), Some(name)) = (current.as_mut(), open.last()) {
                    let text = t.unescape()?;
                    let text = text.trim();
                    if !text.is_empty() {
                        fields
                            .entry(name.clone())
                            .or_insert_with(|| text.to_string());
                    }
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if current.is_some() {
                    open.pop();
                    if open.is_empty() {
                        records.extend(current.take());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(records)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn collect_attributes(e: &BytesStart<'_>, fields: &mut Fields) -> Result<()> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.trim().to_string();
        if !value.is_empty() {
            fields.entry(key).or_insert(value);
        }
    }
    Ok(())
}

/// Records of a JSON dump: a top-level array, or an object whose `data`
/// member is one. Nested objects are flattened into the record.
pub fn json_records(json: &[u8]) -> Result<Vec<Fields>> {
    let value: Value = serde_json::from_slice(without_bom(json))?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => return Err(AppError::decode("json", "object without a `data` array")),
        },
        _ => return Err(AppError::decode("json", "expected an array or object")),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => {
                let mut fields = Fields::new();
                flatten_json(map, &mut fields);
                Some(fields)
            }
            _ => None,
        })
        .collect())
}

fn flatten_json(map: serde_json::Map<String, Value>, fields: &mut Fields) {
    for (key, value) in map {
        let text = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Object(nested) => {
                flatten_json(nested, fields);
                continue;
            }
            Value::Null | Value::Array(_) => continue,
        };
        let text = text.trim().to_string();
        if !text.is_empty() {
            fields.entry(key).or_insert(text);
        }
    }
}

/// First non-empty value among `keys`, matched exactly and then
/// case-insensitively.
pub fn first_of<'a>(fields: &'a Fields, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| fields.get(*k))
        .or_else(|| {
            keys.iter().find_map(|k| {
                let wanted = k.to_lowercase();
                fields
                    .iter()
                    .find(|(name, _)| name.to_lowercase() == wanted)
                    .map(|(_, v)| v)
            })
        })
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}


#[cfg(test)]
mod tests {
    use super::*;

    const DOHOD_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Файл ИдФайл="VO_OTKRDAN" ВерсФорм="4.01">
  <Документ ИдДок="1" ДатаДок="01.10.2024">
    <СведНП НаимОрг="ООО &quot;ПРОМО ГРУПП&quot;" ИННЮЛ="7701234567"/>
    <СведДохРасх СумДоход="350000000.50" СумРасход="300000000"/>
  </Документ>
  <Документ ИдДок="2">
    <СведНП НаимОрг="АО ВЕКТОР" ИННЮЛ="7809876543"/>
    <Адрес>г. Санкт-Петербург</Адрес>
  </Документ>
</Файл>"#;

    #[test]
    fn test_xml_records_from_attributes_and_text() {
        let records = xml_records(DOHOD_XML.as_bytes(), "Документ").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["НаимОрг"], "ООО \"ПРОМО ГРУПП\"");
        assert_eq!(records[0]["СумДоход"], "350000000.50");
        assert_eq!(records[0]["ИдДок"], "1");
        assert_eq!(records[1]["Адрес"], "г. Санкт-Петербург");
    }

    #[test]
    fn test_xml_without_record_tag_uses_root_children() {
        let xml = r#"<rows><row inn="7701234567"><name>Acme</name></row><row inn="7809876543"/></rows>"#;
        let records = xml_records(xml.as_bytes(), "Документ").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], "Acme");
        assert_eq!(records[1]["inn"], "7809876543");
    }

    #[test]
    fn test_json_array_and_data_object() {
        let array = br#"[{"inn": "7701234567", "name": "Acme", "revenue": 250000000}, 5]"#;
        let records = json_records(array).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["revenue"], "250000000");

        let wrapped = r#"{"data": [{"ИНН": "7701234567", "info": {"НаимОрг": "Ромашка"}}]}"#;
        let records = json_records(wrapped.as_bytes()).unwrap();
        assert_eq!(records[0]["НаимОрг"], "Ромашка");

        assert!(json_records(br#"{"rows": []}"#).is_err());
    }

    #[test]
    fn test_unpack_prefers_xml_member() {
        let bundle = testing::zip_bytes(&[
            ("readme.txt", b"hello"),
            ("data.json", b"[]"),
            ("data/VO_OTKRDAN.XML", DOHOD_XML.as_bytes()),
        ]);
        match unpack(bundle, None).unwrap() {
            Payload::Xml(body) => assert_eq!(body, DOHOD_XML.as_bytes()),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_unpack_rejects_unknown_payloads() {
        assert!(unpack(b"hello".to_vec(), None).is_err());
        let bundle = testing::zip_bytes(&[("readme.txt", b"hello")]);
        assert!(matches!(unpack(bundle, None), Err(AppError::Decode { .. })));
        assert!(unpack(b"\xEF\xBB\xBF  [1]".to_vec(), None).is_ok());
    }

    #[test]
    fn test_records_after_byte_order_mark() {
        let json = b"\xEF\xBB\xBF[{\"inn\":\"7701234567\",\"name\":\"X\"}]".to_vec();
        let rows = records(json, "Документ", None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["inn"], "7701234567");

        let mut xml = UTF8_BOM.to_vec();
        xml.extend_from_slice(DOHOD_XML.as_bytes());
        let rows = records(xml, "Документ", Some(DatasetFormat::Xml)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["ИННЮЛ"], "7701234567");
    }

    #[test]
    fn test_format_hint() {
        let bundle = testing::zip_bytes(&[
            ("data.xml", DOHOD_XML.as_bytes()),
            ("data.json", b"[]"),
        ]);
        assert_eq!(
            unpack(bundle.clone(), Some(DatasetFormat::Json)).unwrap(),
            Payload::Json(b"[]".to_vec())
        );
        assert!(matches!(
            unpack(bundle, Some(DatasetFormat::Xml)).unwrap(),
            Payload::Xml(_)
        ));

        // Content wins over the hint for raw bodies.
        assert_eq!(
            unpack(b"[1]".to_vec(), Some(DatasetFormat::Xml)).unwrap(),
            Payload::Json(b"[1]".to_vec())
        );
        assert!(matches!(
            unpack(b"garbage".to_vec(), Some(DatasetFormat::Json)),
            Ok(Payload::Json(_))
        ));
    }

    #[test]
    fn test_first_of_variants() {
        let mut fields = Fields::new();
        fields.insert("ИННЮЛ".into(), "7701234567".into());
        fields.insert("Name".into(), "Acme".into());
        assert_eq!(first_of(&fields, &["inn", "ИННЮЛ"]), Some("7701234567"));
        assert_eq!(first_of(&fields, &["name"]), Some("Acme"));
        assert_eq!(first_of(&fields, &["okved"]), None);
    }
}
