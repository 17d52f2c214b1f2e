//! Network serialization/deserialization (feature: `serde`).
//!
//! This module defines a versioned JSON format for [`Network`].
//!
//! Design notes:
//! - The document is a separate struct rather than a derive on `Network`, so
//!   the file format stays stable if the in-memory layout changes.
//! - Every field of the network is captured: layers, weights, momentum and
//!   error buffers, output mode and rates. Topology is implied by the shapes.
//! - Loading validates every shape against that topology, the bias slots, and
//!   that all values are finite. A failed load returns no network.
//! - JSON has no encoding for NaN or infinity, so saving runs the same
//!   validation first and refuses a diverged network without writing anything.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Matrix, Network, Rates, Result};

pub const NETWORK_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNetwork {
    pub format_version: u32,
    pub regression: bool,
    pub learning_rate: f64,
    pub momentum: f64,
    pub input_layer: Vec<f64>,
    pub hidden_layer: Vec<f64>,
    pub output_layer: Vec<f64>,
    /// Row-major (hidden + 1, inputs + 1).
    pub weight_hidden: Matrix,
    /// Row-major (outputs, hidden + 1).
    pub weight_output: Matrix,
    pub last_change_hidden: Matrix,
    pub last_change_output: Matrix,
    pub err_output: Vec<f64>,
    pub err_hidden: Vec<f64>,
}

impl SerializedNetwork {
    pub fn validate(&self) -> Result<()> {
        if self.format_version != NETWORK_FORMAT_VERSION {
            return Err(Error::InvalidData(format!(
                "unsupported network format_version {}; expected {}",
                self.format_version, NETWORK_FORMAT_VERSION
            )));
        }

        Rates {
            learning_rate: self.learning_rate,
            momentum: self.momentum,
        }
        .validate()
        .map_err(|e| Error::InvalidData(format!("invalid rates: {e}")))?;

        let input_slots = self.input_layer.len();
        let hidden_slots = self.hidden_layer.len();
        let outputs = self.output_layer.len();
        if input_slots < 2 || hidden_slots < 2 || outputs == 0 {
            return Err(Error::InvalidData(format!(
                "layer sizes must leave at least one unit besides the bias, got \
                 input={input_slots} hidden={hidden_slots} output={outputs}"
            )));
        }

        check_len("err_output", self.err_output.len(), outputs)?;
        check_len("err_hidden", self.err_hidden.len(), hidden_slots - 1)?;
        check_shape("weight_hidden", &self.weight_hidden, hidden_slots, input_slots)?;
        check_shape("last_change_hidden", &self.last_change_hidden, hidden_slots, input_slots)?;
        check_shape("weight_output", &self.weight_output, outputs, hidden_slots)?;
        check_shape("last_change_output", &self.last_change_output, outputs, hidden_slots)?;
        check_bias("input_layer", &self.input_layer)?;
        check_bias("hidden_layer", &self.hidden_layer)?;

        let vectors = [
            &self.input_layer,
            &self.hidden_layer,
            &self.output_layer,
            &self.err_output,
            &self.err_hidden,
        ];
        let matrices = [
            &self.weight_hidden,
            &self.weight_output,
            &self.last_change_hidden,
            &self.last_change_output,
        ];
        if vectors.iter().any(|v| v.iter().any(|x| !x.is_finite()))
            || matrices.iter().any(|m| !m.is_finite())
        {
            return Err(Error::InvalidData(
                "network must contain only finite values".to_owned(),
            ));
        }

        Ok(())
    }
}

fn check_len(name: &str, len: usize, expected: usize) -> Result<()> {
    if len != expected {
        return Err(Error::InvalidData(format!(
            "{name} length {len} does not match expected {expected}"
        )));
    }
    Ok(())
}

/// The bias slot reads 0.0 until the first forward pass sets it to 1.0.
fn check_bias(name: &str, layer: &[f64]) -> Result<()> {
    match layer.last() {
        Some(&b) if b == 0.0 || b == 1.0 => Ok(()),
        Some(&b) => Err(Error::InvalidData(format!(
            "{name} bias slot must be 0 or 1, got {b}"
        ))),
        None => Err(Error::InvalidData(format!("{name} is empty"))),
    }
}

fn check_shape(name: &str, m: &Matrix, rows: usize, cols: usize) -> Result<()> {
    if m.rows() != rows || m.cols() != cols || m.as_slice().len() != rows * cols {
        return Err(Error::InvalidData(format!(
            "{name} shape ({}, {}) with {} values does not match ({rows}, {cols})",
            m.rows(),
            m.cols(),
            m.as_slice().len()
        )));
    }
    Ok(())
}

impl From<&Network> for SerializedNetwork {
    fn from(net: &Network) -> Self {
        Self {
            format_version: NETWORK_FORMAT_VERSION,
            regression: net.regression,
            learning_rate: net.rates.learning_rate,
            momentum: net.rates.momentum,
            input_layer: net.input_layer.clone(),
            hidden_layer: net.hidden_layer.clone(),
            output_layer: net.output_layer.clone(),
            weight_hidden: net.weight_hidden.clone(),
            weight_output: net.weight_output.clone(),
            last_change_hidden: net.last_change_hidden.clone(),
            last_change_output: net.last_change_output.clone(),
            err_output: net.err_output.clone(),
            err_hidden: net.err_hidden.clone(),
        }
    }
}

impl TryFrom<SerializedNetwork> for Network {
    type Error = Error;

    fn try_from(value: SerializedNetwork) -> std::result::Result<Self, Self::Error> {
        value.validate()?;

        Ok(Network {
            input_layer: value.input_layer,
            hidden_layer: value.hidden_layer,
            output_layer: value.output_layer,
            weight_hidden: value.weight_hidden,
            weight_output: value.weight_output,
            last_change_hidden: value.last_change_hidden,
            last_change_output: value.last_change_output,
            err_output: value.err_output,
            err_hidden: value.err_hidden,
            regression: value.regression,
            rates: Rates {
                learning_rate: value.learning_rate,
                momentum: value.momentum,
            },
        })
    }
}

/// JSON errors caused by the underlying reader/writer surface as [`Error::Io`].
fn json_error(context: &str, e: serde_json::Error) -> Error {
    if e.is_io() {
        Error::Io(e.into())
    } else {
        Error::InvalidData(format!("{context}: {e}"))
    }
}

impl Network {
    /// Snapshot of the network, checked so that it will load back.
    fn document(&self) -> Result<SerializedNetwork> {
        let doc = SerializedNetwork::from(self);
        doc.validate()?;
        Ok(doc)
    }

    /// Serialize the network to a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.document()?)
            .map_err(|e| json_error("failed to serialize network", e))
    }

    /// Serialize the network to a compact JSON string.
    ///
    /// Fails with [`Error::InvalidData`] if any value is NaN or infinite.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(&self.document()?)
            .map_err(|e| json_error("failed to serialize network", e))
    }

    /// Parse a network from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let ser: SerializedNetwork =
            serde_json::from_str(s).map_err(|e| json_error("failed to parse network json", e))?;
        ser.try_into()
    }

    /// Write the network as compact JSON.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, &self.document()?)
            .map_err(|e| json_error("failed to serialize network", e))
    }

    /// Read a network written by [`to_writer`](Self::to_writer) or any of the string forms.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let ser: SerializedNetwork = serde_json::from_reader(reader)
            .map_err(|e| json_error("failed to parse network json", e))?;
        ser.try_into()
    }

    /// Save the network to a JSON file.
    ///
    /// A network holding non-finite values is rejected before the file is created.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let p = path.as_ref();
        let doc = self.document()?;
        let mut writer = BufWriter::new(File::create(p)?);
        serde_json::to_writer(&mut writer, &doc)
            .map_err(|e| json_error("failed to serialize network", e))?;
        writer.flush()?;
        debug!(path = %p.display(), "network saved");
        Ok(())
    }

    /// Load a network from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let net = Self::from_reader(BufReader::new(File::open(p)?))?;
        debug!(path = %p.display(), "network loaded");
        Ok(net)
    }
}
