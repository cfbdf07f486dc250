// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The Digital Green Certificate payload schema.
//!
//! The HCERT claim embeds a CBOR map using the published short keys
//! (`ver`, `nam`, `dob`, `v`, `t`, `r` at the top level). Every short key
//! maps to exactly one field below — a static table instead of a runtime
//! reflection step — and unknown keys are skipped so schema growth does not
//! break decoding. Clinical code and date fields are transported as opaque
//! strings; this layer assigns them no meaning.

use minicbor::data::Type;
use minicbor::{Decoder, Encoder};

use crate::error::DgcError;

/// EU Digital Green Certificate payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DigitalGreenCertificate {
    /// Schema version (`ver`), semantic versioning.
    pub version: String,
    /// Person name block (`nam`).
    pub name: Option<PersonName>,
    /// Date of birth (`dob`), ISO 8601 date kept verbatim.
    pub date_of_birth: Option<String>,
    /// Vaccination group (`v`).
    pub vaccinations: Vec<VaccinationEntry>,
    /// Test group (`t`).
    pub tests: Vec<TestEntry>,
    /// Recovery group (`r`).
    pub recoveries: Vec<RecoveryEntry>,
}

/// Surname(s) and given name(s), with ICAO 9303 transliterations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonName {
    /// Family name (`fn`).
    pub family_name: Option<String>,
    /// Family name transliterated (`fnt`).
    pub family_name_transliterated: Option<String>,
    /// Given name (`gn`).
    pub given_name: Option<String>,
    /// Given name transliterated (`gnt`).
    pub given_name_transliterated: Option<String>,
}

/// Vaccination entry (`v[...]`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VaccinationEntry {
    /// Unique certificate identifier (`ci`).
    pub certificate_id: String,
    /// Country of vaccination (`co`).
    pub country: String,
    /// Dose number (`dn`).
    pub dose_number: i64,
    /// Date of vaccination (`dt`).
    pub vaccination_date: String,
    /// Certificate issuer (`is`).
    pub issuer: String,
    /// Marketing authorization holder or manufacturer (`ma`).
    pub manufacturer: String,
    /// Vaccine medicinal product (`mp`).
    pub medicinal_product: String,
    /// Total series of doses (`sd`).
    pub total_doses: i64,
    /// Disease or agent targeted (`tg`).
    pub disease_agent: String,
    /// Vaccine or prophylaxis (`vp`).
    pub vaccine: String,
}

/// Test entry (`t[...]`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestEntry {
    /// Unique certificate identifier (`ci`).
    pub certificate_id: String,
    /// Country of test (`co`).
    pub country: String,
    /// Certificate issuer (`is`).
    pub issuer: String,
    /// RAT test name and manufacturer (`ma`).
    pub manufacturer: Option<String>,
    /// NAA test name (`nm`).
    pub test_name: Option<String>,
    /// Date/time of sample collection (`sc`).
    pub sample_collection_date: String,
    /// Testing centre (`tc`).
    pub testing_centre: String,
    /// Disease or agent targeted (`tg`).
    pub disease_agent: String,
    /// Test result (`tr`).
    pub test_result: String,
    /// Type of test (`tt`).
    pub test_type: String,
}

/// Recovery entry (`r[...]`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecoveryEntry {
    /// Unique certificate identifier (`ci`).
    pub certificate_id: String,
    /// Country of test (`co`).
    pub country: String,
    /// Certificate valid from (`df`).
    pub valid_from: String,
    /// Certificate valid until (`du`).
    pub valid_until: String,
    /// Date of first positive test result (`fr`).
    pub first_positive_test_date: String,
    /// Certificate issuer (`is`).
    pub issuer: String,
    /// Disease or agent targeted (`tg`).
    pub disease_agent: String,
}

impl DigitalGreenCertificate {
    /// Decode the certificate payload map at the decoder's position.
    pub(crate) fn decode(dec: &mut Decoder<'_>) -> Result<Self, DgcError> {
        let len = read_map_len(dec, "certificate payload")?;

        let mut cert = DigitalGreenCertificate::default();
        for _ in 0..len {
            match read_field_key(dec)? {
                Some("ver") => cert.version = read_str(dec, "ver")?,
                Some("nam") => cert.name = Some(PersonName::decode(dec)?),
                Some("dob") => cert.date_of_birth = Some(read_str(dec, "dob")?),
                Some("v") => cert.vaccinations = decode_entries(dec, VaccinationEntry::decode)?,
                Some("t") => cert.tests = decode_entries(dec, TestEntry::decode)?,
                Some("r") => cert.recoveries = decode_entries(dec, RecoveryEntry::decode)?,
                _ => skip_value(dec)?,
            }
        }
        Ok(cert)
    }

    /// Encode the certificate payload map at the encoder's position.
    ///
    /// Empty entry arrays and absent optional fields are omitted.
    pub(crate) fn encode(&self, enc: &mut Encoder<Vec<u8>>) -> Result<(), DgcError> {
        let len = 1
            + u64::from(self.name.is_some())
            + u64::from(self.date_of_birth.is_some())
            + u64::from(!self.vaccinations.is_empty())
            + u64::from(!self.tests.is_empty())
            + u64::from(!self.recoveries.is_empty());
        enc.map(len).map_err(cbor_err)?;

        write_str(enc, "ver", &self.version)?;
        if let Some(name) = &self.name {
            enc.str("nam").map_err(cbor_err)?;
            name.encode(enc)?;
        }
        if let Some(dob) = &self.date_of_birth {
            write_str(enc, "dob", dob)?;
        }
        if !self.vaccinations.is_empty() {
            enc.str("v").map_err(cbor_err)?;
            enc.array(self.vaccinations.len() as u64).map_err(cbor_err)?;
            for entry in &self.vaccinations {
                entry.encode(enc)?;
            }
        }
        if !self.tests.is_empty() {
            enc.str("t").map_err(cbor_err)?;
            enc.array(self.tests.len() as u64).map_err(cbor_err)?;
            for entry in &self.tests {
                entry.encode(enc)?;
            }
        }
        if !self.recoveries.is_empty() {
            enc.str("r").map_err(cbor_err)?;
            enc.array(self.recoveries.len() as u64).map_err(cbor_err)?;
            for entry in &self.recoveries {
                entry.encode(enc)?;
            }
        }
        Ok(())
    }
}

impl PersonName {
    fn decode(dec: &mut Decoder<'_>) -> Result<Self, DgcError> {
        let len = read_map_len(dec, "name block")?;
        let mut name = PersonName::default();
        for _ in 0..len {
            match read_field_key(dec)? {
                Some("fn") => name.family_name = Some(read_str(dec, "fn")?),
                Some("fnt") => name.family_name_transliterated = Some(read_str(dec, "fnt")?),
                Some("gn") => name.given_name = Some(read_str(dec, "gn")?),
                Some("gnt") => name.given_name_transliterated = Some(read_str(dec, "gnt")?),
                _ => skip_value(dec)?,
            }
        }
        Ok(name)
    }

    fn encode(&self, enc: &mut Encoder<Vec<u8>>) -> Result<(), DgcError> {
        let fields = [
            ("fn", &self.family_name),
            ("fnt", &self.family_name_transliterated),
            ("gn", &self.given_name),
            ("gnt", &self.given_name_transliterated),
        ];
        let len = fields.iter().filter(|(_, v)| v.is_some()).count() as u64;
        enc.map(len).map_err(cbor_err)?;
        for (key, value) in fields {
            if let Some(value) = value {
                write_str(enc, key, value)?;
            }
        }
        Ok(())
    }
}

impl VaccinationEntry {
    fn decode(dec: &mut Decoder<'_>) -> Result<Self, DgcError> {
        let len = read_map_len(dec, "vaccination entry")?;
        let mut entry = VaccinationEntry::default();
        for _ in 0..len {
            match read_field_key(dec)? {
                Some("ci") => entry.certificate_id = read_str(dec, "ci")?,
                Some("co") => entry.country = read_str(dec, "co")?,
                Some("dn") => entry.dose_number = read_i64(dec, "dn")?,
                Some("dt") => entry.vaccination_date = read_str(dec, "dt")?,
                Some("is") => entry.issuer = read_str(dec, "is")?,
                Some("ma") => entry.manufacturer = read_str(dec, "ma")?,
                Some("mp") => entry.medicinal_product = read_str(dec, "mp")?,
                Some("sd") => entry.total_doses = read_i64(dec, "sd")?,
                Some("tg") => entry.disease_agent = read_str(dec, "tg")?,
                Some("vp") => entry.vaccine = read_str(dec, "vp")?,
                _ => skip_value(dec)?,
            }
        }
        Ok(entry)
    }

    fn encode(&self, enc: &mut Encoder<Vec<u8>>) -> Result<(), DgcError> {
        enc.map(10).map_err(cbor_err)?;
        write_str(enc, "ci", &self.certificate_id)?;
        write_str(enc, "co", &self.country)?;
        write_i64(enc, "dn", self.dose_number)?;
        write_str(enc, "dt", &self.vaccination_date)?;
        write_str(enc, "is", &self.issuer)?;
        write_str(enc, "ma", &self.manufacturer)?;
        write_str(enc, "mp", &self.medicinal_product)?;
        write_i64(enc, "sd", self.total_doses)?;
        write_str(enc, "tg", &self.disease_agent)?;
        write_str(enc, "vp", &self.vaccine)?;
        Ok(())
    }
}

impl TestEntry {
    fn decode(dec: &mut Decoder<'_>) -> Result<Self, DgcError> {
        let len = read_map_len(dec, "test entry")?;
        let mut entry = TestEntry::default();
        for _ in 0..len {
            match read_field_key(dec)? {
                Some("ci") => entry.certificate_id = read_str(dec, "ci")?,
                Some("co") => entry.country = read_str(dec, "co")?,
                Some("is") => entry.issuer = read_str(dec, "is")?,
                Some("ma") => entry.manufacturer = Some(read_str(dec, "ma")?),
                Some("nm") => entry.test_name = Some(read_str(dec, "nm")?),
                Some("sc") => entry.sample_collection_date = read_str(dec, "sc")?,
                Some("tc") => entry.testing_centre = read_str(dec, "tc")?,
                Some("tg") => entry.disease_agent = read_str(dec, "tg")?,
                Some("tr") => entry.test_result = read_str(dec, "tr")?,
                Some("tt") => entry.test_type = read_str(dec, "tt")?,
                _ => skip_value(dec)?,
            }
        }
        Ok(entry)
    }

    fn encode(&self, enc: &mut Encoder<Vec<u8>>) -> Result<(), DgcError> {
        let len = 8
            + u64::from(self.manufacturer.is_some())
            + u64::from(self.test_name.is_some());
        enc.map(len).map_err(cbor_err)?;
        write_str(enc, "ci", &self.certificate_id)?;
        write_str(enc, "co", &self.country)?;
        write_str(enc, "is", &self.issuer)?;
        if let Some(manufacturer) = &self.manufacturer {
            write_str(enc, "ma", manufacturer)?;
        }
        if let Some(test_name) = &self.test_name {
            write_str(enc, "nm", test_name)?;
        }
        write_str(enc, "sc", &self.sample_collection_date)?;
        write_str(enc, "tc", &self.testing_centre)?;
        write_str(enc, "tg", &self.disease_agent)?;
        write_str(enc, "tr", &self.test_result)?;
        write_str(enc, "tt", &self.test_type)?;
        Ok(())
    }
}

impl RecoveryEntry {
    fn decode(dec: &mut Decoder<'_>) -> Result<Self, DgcError> {
        let len = read_map_len(dec, "recovery entry")?;
        let mut entry = RecoveryEntry::default();
        for _ in 0..len {
            match read_field_key(dec)? {
                Some("ci") => entry.certificate_id = read_str(dec, "ci")?,
                Some("co") => entry.country = read_str(dec, "co")?,
                Some("df") => entry.valid_from = read_str(dec, "df")?,
                Some("du") => entry.valid_until = read_str(dec, "du")?,
                Some("fr") => entry.first_positive_test_date = read_str(dec, "fr")?,
                Some("is") => entry.issuer = read_str(dec, "is")?,
                Some("tg") => entry.disease_agent = read_str(dec, "tg")?,
                _ => skip_value(dec)?,
            }
        }
        Ok(entry)
    }

    fn encode(&self, enc: &mut Encoder<Vec<u8>>) -> Result<(), DgcError> {
        enc.map(7).map_err(cbor_err)?;
        write_str(enc, "ci", &self.certificate_id)?;
        write_str(enc, "co", &self.country)?;
        write_str(enc, "df", &self.valid_from)?;
        write_str(enc, "du", &self.valid_until)?;
        write_str(enc, "fr", &self.first_positive_test_date)?;
        write_str(enc, "is", &self.issuer)?;
        write_str(enc, "tg", &self.disease_agent)?;
        Ok(())
    }
}

fn decode_entries<T>(
    dec: &mut Decoder<'_>,
    decode_one: impl Fn(&mut Decoder<'_>) -> Result<T, DgcError>,
) -> Result<Vec<T>, DgcError> {
    let len = dec
        .array()
        .map_err(|e| DgcError::MalformedClaims(format!("entry group is not an array: {e}")))?
        .ok_or_else(|| {
            DgcError::MalformedClaims("indefinite-length arrays are not supported".to_string())
        })?;

    let mut entries = Vec::with_capacity(len as usize);
    for _ in 0..len {
        entries.push(decode_one(dec)?);
    }
    Ok(entries)
}

/// Read a map key, returning `None` for non-text keys (whose values the
/// caller skips).
fn read_field_key<'a>(dec: &mut Decoder<'a>) -> Result<Option<&'a str>, DgcError> {
    match dec.datatype().map_err(cbor_err)? {
        Type::String => Ok(Some(dec.str().map_err(cbor_err)?)),
        _ => {
            dec.skip().map_err(cbor_err)?;
            Ok(None)
        }
    }
}

fn read_map_len(dec: &mut Decoder<'_>, what: &str) -> Result<u64, DgcError> {
    dec.map()
        .map_err(|e| DgcError::MalformedClaims(format!("{what} is not a map: {e}")))?
        .ok_or_else(|| {
            DgcError::MalformedClaims("indefinite-length maps are not supported".to_string())
        })
}

fn read_str(dec: &mut Decoder<'_>, field: &str) -> Result<String, DgcError> {
    // Some issuers wrap date fields in a CBOR tag (0 or 1004); the string
    // underneath is what travels.
    if matches!(dec.datatype().map_err(cbor_err)?, Type::Tag) {
        dec.tag().map_err(cbor_err)?;
    }
    dec.str()
        .map(str::to_string)
        .map_err(|e| DgcError::MalformedClaims(format!("field {field} is not a text string: {e}")))
}

fn read_i64(dec: &mut Decoder<'_>, field: &str) -> Result<i64, DgcError> {
    dec.i64()
        .map_err(|e| DgcError::MalformedClaims(format!("field {field} is not an integer: {e}")))
}

fn skip_value(dec: &mut Decoder<'_>) -> Result<(), DgcError> {
    dec.skip().map_err(cbor_err)
}

fn write_str(enc: &mut Encoder<Vec<u8>>, key: &str, value: &str) -> Result<(), DgcError> {
    enc.str(key).map_err(cbor_err)?;
    enc.str(value).map_err(cbor_err)?;
    Ok(())
}

fn write_i64(enc: &mut Encoder<Vec<u8>>, key: &str, value: i64) -> Result<(), DgcError> {
    enc.str(key).map_err(cbor_err)?;
    enc.i64(value).map_err(cbor_err)?;
    Ok(())
}

fn cbor_err<E: std::fmt::Display>(e: E) -> DgcError {
    DgcError::MalformedClaims(e.to_string())
}
