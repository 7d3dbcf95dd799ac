//! Plain-text persistence of a network's parameters.
//!
//! One value per line, in a fixed order: the fitness, then every
//! bias (layer by layer, input layer included), then every weight
//! (destination layer, destination neuron, source neuron). The
//! shape itself is not stored; a file can only be loaded into a
//! network with the same layer sizes it was saved from.
use super::{FeedforwardNetwork, PersistenceError};

use tracing::debug;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

impl FeedforwardNetwork {
    /// Number of values in this network's persisted form.
    pub fn value_count(&self) -> usize {
        1 + self.biases.iter().map(|l| l.len()).sum::<usize>()
            + self.weights.iter().map(|l| l.len()).sum::<usize>()
    }

    /// Writes the network to the file at `path`, replacing it
    /// if it exists.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        debug!(path = %path.display(), values = self.value_count(), "saved network");
        Ok(())
    }

    /// Writes the network's persisted form to `writer`.
    ///
    /// # Errors
    /// Propagates any error from the writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{}", self.fitness)?;
        for bias in self.biases.iter().flat_map(|l| l.iter()) {
            writeln!(writer, "{}", bias)?;
        }
        for weight in self.weights.iter().flat_map(|l| l.iter()) {
            writeln!(writer, "{}", weight)?;
        }
        Ok(())
    }

    /// Loads the network's fitness and parameters from the file
    /// at `path`.
    ///
    /// Returns `Ok(false)` without touching the network if the
    /// file does not exist, and `Ok(true)` once loaded.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, holds something
    /// other than numbers, or holds a number of values that doesn't
    /// match the network's shape. The network is left unmodified in
    /// every error case.
    ///
    /// # Examples
    /// ```
    /// use neuroflap_nn::networks::FeedforwardNetwork;
    ///
    /// let mut network = FeedforwardNetwork::zeroed(&[2, 2, 1]).unwrap();
    /// let loaded = network.load("/definitely/not/here/network-0.ai").unwrap();
    /// assert!(!loaded);
    /// ```
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<bool, PersistenceError> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no saved network");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        self.read_from(BufReader::new(file))?;
        debug!(path = %path.display(), "loaded network");
        Ok(true)
    }

    /// Reads the network's fitness and parameters from `reader`.
    /// Blank lines are ignored.
    ///
    /// The whole input is validated before anything is assigned.
    ///
    /// # Errors
    /// Same as [`load`](Self::load), except for missing files.
    pub fn read_from<R: BufRead>(&mut self, reader: R) -> Result<(), PersistenceError> {
        let mut lines = vec![];
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                lines.push((index + 1, trimmed.to_owned()));
            }
        }

        let expected = self.value_count();
        if lines.len() != expected {
            return Err(PersistenceError::ValueCount {
                expected,
                found: lines.len(),
            });
        }

        let fitness: f32 = parse_line(&lines[0])?;
        let values = lines[1..]
            .iter()
            .map(parse_line)
            .collect::<Result<Vec<f64>, _>>()?;

        self.fitness = fitness;
        let slots = self
            .biases
            .iter_mut()
            .chain(self.weights.iter_mut())
            .flat_map(|layer| layer.iter_mut());
        for (slot, value) in slots.zip(values) {
            *slot = value;
        }
        Ok(())
    }
}

fn parse_line<T: std::str::FromStr>((line, value): &(usize, String)) -> Result<T, PersistenceError> {
    value.parse().map_err(|_| PersistenceError::Parse {
        line: *line,
        value: value.clone(),
    })
}
