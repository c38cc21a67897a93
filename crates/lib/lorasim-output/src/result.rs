use std::fs;
use std::path::{Path, PathBuf};

use arrow::datatypes::Schema;
use log::debug;
use serde::Deserialize;

use lorasim_core::bucket::TimeMS;

use crate::tables::airtime::AirtimeWriter;
use crate::tables::measure::MeasurementWriter;
use crate::tables::reception::ReceptionWriter;
use crate::writer::OutputError;

#[derive(Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputType {
    Measurements,
    Airtime,
    Receptions,
}

#[derive(Deserialize, Debug, Clone)]
pub struct OutputSettings {
    pub output_interval: TimeMS,
    pub output_path: String,
    pub outputs: Vec<Outputs>,
    pub scenario_id: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Outputs {
    pub output_type: OutputType,
    pub output_filename: String,
}

pub trait ResultWriter {
    fn schema() -> Schema;
    fn write_to_file(&mut self) -> Result<(), OutputError>;
    fn close_file(self) -> Result<(), OutputError>;
}

/// The result tables requested in the output settings.
#[derive(Debug)]
pub struct Results {
    pub measurements: Option<MeasurementWriter>,
    pub airtime: Option<AirtimeWriter>,
    pub receptions: Option<ReceptionWriter>,
}

impl Results {
    pub fn new(output_settings: &OutputSettings) -> Result<Self, OutputError> {
        let output_path = Path::new(&output_settings.output_path)
            .join(output_settings.scenario_id.to_string())
            .join("files");
        if !output_path.exists() {
            fs::create_dir_all(&output_path)?;
        }
        debug!("Writing results to {}", output_path.display());

        let measurements = Self::file_for(output_settings, &output_path, OutputType::Measurements)
            .map(|file| MeasurementWriter::new(&file))
            .transpose()?;
        let airtime = Self::file_for(output_settings, &output_path, OutputType::Airtime)
            .map(|file| AirtimeWriter::new(&file))
            .transpose()?;
        let receptions = Self::file_for(output_settings, &output_path, OutputType::Receptions)
            .map(|file| ReceptionWriter::new(&file))
            .transpose()?;
        Ok(Self {
            measurements,
            airtime,
            receptions,
        })
    }

    /// The last entry of a type wins when the settings list it more than once.
    fn file_for(
        output_settings: &OutputSettings,
        output_path: &Path,
        output_type: OutputType,
    ) -> Option<PathBuf> {
        output_settings
            .outputs
            .iter()
            .filter(|output| output.output_type == output_type)
            .last()
            .map(|settings| output_path.join(&settings.output_filename))
    }

    pub fn write_to_file(&mut self) -> Result<(), OutputError> {
        if let Some(writer) = &mut self.measurements {
            writer.write_to_file()?;
        }
        if let Some(writer) = &mut self.airtime {
            writer.write_to_file()?;
        }
        if let Some(writer) = &mut self.receptions {
            writer.write_to_file()?;
        }
        Ok(())
    }

    pub fn close_files(self) -> Result<(), OutputError> {
        if let Some(writer) = self.measurements {
            writer.close_file()?;
        }
        if let Some(writer) = self.airtime {
            writer.close_file()?;
        }
        if let Some(writer) = self.receptions {
            writer.close_file()?;
        }
        Ok(())
    }
}
