use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use log::info;
use rand::Rng;
use rand_pcg::Pcg64Mcg;

use lorasim_core::agent::{AgentId, Location, NodeInfo};
use lorasim_core::bucket::TimeMS;
use lorasim_core::model::BucketModel;
use lorasim_core::scheduler::EventScheduler;
use lorasim_models::air::interface::AirInterface;
use lorasim_models::air::observe::LogObserver;
use lorasim_models::dist::RngSampler;
use lorasim_models::net::propagation::PropagationType;
use lorasim_models::net::snr::NoiseFloorSnr;
use lorasim_output::logger::initiate_logger;
use lorasim_output::result::Results;

use crate::lora::bucket::{GatewayAir, GatewayBucket};
use crate::lora::decode::Demodulator;
use crate::lora::device::{DeviceRadio, EndDevice};
use crate::simulation::config::{BaseConfig, BaseConfigReader, DeviceGroupSettings};

pub type GScheduler = EventScheduler<EndDevice, GatewayBucket>;

const GATEWAY_ID: u64 = 0;

pub struct SimulationBuilder {
    base_config: BaseConfig,
    config_path: PathBuf,
}

impl SimulationBuilder {
    pub(crate) fn new(base_config_file: &str) -> Self {
        if !Path::new(base_config_file).exists() {
            panic!("Configuration file is not found.");
        }
        let config_path = Path::new(base_config_file)
            .parent()
            .unwrap_or_else(|| {
                panic!("Invalid directory for the configuration file");
            })
            .to_path_buf();

        let config_reader = BaseConfigReader::new(base_config_file);
        match config_reader.parse() {
            Ok(base_config) => Self {
                base_config,
                config_path,
            },
            Err(e) => {
                panic!("Error while parsing the base configuration file: {}", e);
            }
        }
    }

    pub(crate) fn build(&mut self) -> GScheduler {
        initiate_logger(
            &self.config_path,
            &self.base_config.log_settings,
            Some(self.base_config.output_settings.scenario_id),
        );
        info!(
            "Building scenario {}...",
            self.base_config.simulation_settings.scenario
        );
        let bucket = self.build_gateway_bucket();
        let agents = self.build_devices();
        self.build_scheduler(agents, bucket)
    }

    fn gateway_info(&self) -> NodeInfo {
        NodeInfo::builder()
            .id(AgentId::from(GATEWAY_ID))
            .location(self.base_config.gateway.location)
            .build()
    }

    fn build_gateway_bucket(&self) -> GatewayBucket {
        info!("Building gateway bucket...");
        let results = match Results::new(&self.base_config.output_settings) {
            Ok(results) => results,
            Err(e) => panic!("Error while preparing the output files: {}", e),
        };
        GatewayBucket::builder()
            .air(self.build_air())
            .demodulator(Demodulator::new(&self.base_config.gateway.snr_thresholds))
            .results(results)
            .output_interval(self.output_interval())
            .build()
    }

    fn build_air(&self) -> GatewayAir {
        let mut propagation_settings = self.base_config.propagation.clone();
        if propagation_settings.seed.is_none() {
            propagation_settings.seed = Some(self.sim_seed());
        }
        AirInterface::new(
            self.gateway_info(),
            PropagationType::with_settings(&propagation_settings),
            NoiseFloorSnr::with_settings(&self.base_config.snr),
            LogObserver,
        )
    }

    fn build_devices(&self) -> HashMap<AgentId, EndDevice> {
        info!("Building end devices...");
        let mut rng = Pcg64Mcg::new(self.sim_seed() as u128);
        let mut devices = HashMap::new();
        let mut next_id = GATEWAY_ID + 1;

        for (group_idx, group) in self.base_config.devices.iter().enumerate() {
            info!(
                "Group {}: {} devices within {} m on SF{}",
                group_idx, group.count, group.radius, group.radio.sf
            );
            for _ in 0..group.count {
                let device = self.build_device(AgentId::from(next_id), group, &mut rng);
                devices.insert(device.node.id, device);
                next_id += 1;
            }
        }
        info!("Built {} end devices", devices.len());
        devices
    }

    fn build_device(
        &self,
        device_id: AgentId,
        group: &DeviceGroupSettings,
        rng: &mut Pcg64Mcg,
    ) -> EndDevice {
        let location = place_in_disc(
            &self.base_config.gateway.location,
            group.radius,
            group.indoor_share,
            rng,
        );
        let device_seed = self.sim_seed().wrapping_add(device_id.as_u64());
        let interval = match RngSampler::with_seed(&group.interval, device_seed) {
            Ok(sampler) => sampler,
            Err(e) => panic!("Invalid interval distribution for device {}: {}", device_id, e),
        };

        let radio = DeviceRadio::builder()
            .channels(group.radio.channels.clone())
            .bw(group.radio.bw)
            .sf(group.radio.sf)
            .tp(group.radio.tp)
            .cr(group.radio.cr.unwrap_or(1))
            .payload_size(group.radio.payload_size.unwrap_or(20))
            .build();

        EndDevice::builder()
            .node(
                NodeInfo::builder()
                    .id(device_id)
                    .location(location)
                    .build(),
            )
            .radio(radio)
            .interval(interval)
            .channel_rng(Pcg64Mcg::new(device_seed as u128))
            .max_transmissions(group.max_transmissions)
            .build()
    }

    fn build_scheduler(
        &self,
        agents: HashMap<AgentId, EndDevice>,
        bucket: GatewayBucket,
    ) -> GScheduler {
        info!("Building scheduler...");
        EventScheduler::builder()
            .bucket(bucket)
            .agents(agents)
            .duration(self.duration())
            .build()
    }

    fn output_interval(&self) -> TimeMS {
        self.base_config.output_settings.output_interval
    }

    fn duration(&self) -> TimeMS {
        self.base_config.simulation_settings.duration
    }

    fn sim_seed(&self) -> u64 {
        self.base_config.simulation_settings.seed
    }
}

/// Uniform position over a disc around `center`.
fn place_in_disc(center: &Location, radius: f64, indoor_share: f64, rng: &mut Pcg64Mcg) -> Location {
    let distance = radius * rng.gen::<f64>().sqrt();
    let angle = 2.0 * PI * rng.gen::<f64>();
    let indoor = rng.gen::<f64>() < indoor_share;
    Location::new(
        center.x + distance * angle.cos(),
        center.y + distance * angle.sin(),
        indoor,
    )
}
