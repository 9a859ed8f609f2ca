//! The answer file: departure time and realized route per vehicle.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use tp_fleet::VehicleRegistry;
use tp_network::RoadNetwork;

use crate::{IoError, IoResult};

const HEADER: [&str; 3] = ["#(carId", "StartTime", "RoadId...)"];

/// Write one `(carId, startTime, roadId, ...)` line per vehicle that the
/// planner routed: every dynamic vehicle and every released preset, in
/// registration order.  `startTime` is the tick the vehicle entered its first
/// road.  Returns the number of lines written after the header.
pub fn write_answer<W: Write>(writer: W, fleet: &VehicleRegistry, network: &RoadNetwork) -> IoResult<usize> {
    let mut out = WriterBuilder::new().has_headers(false).flexible(true).from_writer(writer);
    out.write_record(HEADER)?;

    let mut written = 0;
    for v in fleet.ids() {
        let vehicle = fleet.vehicle(v);
        let journey = fleet.journey(v);
        if vehicle.preset && !journey.released {
            continue;
        }
        let Some(start) = journey.entry_time else {
            return Err(IoError::Unplanned { vehicle: vehicle.id });
        };

        let mut fields = Vec::with_capacity(journey.route.len() + 2);
        fields.push(format!("({}", vehicle.id));
        fields.push(start.0.to_string());
        fields.extend(journey.route.iter().map(|&r| network.road(r).id.to_string()));
        if let Some(last) = fields.last_mut() {
            last.push(')');
        }
        out.write_record(&fields)?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// [`write_answer`] to a new file at `path`.
pub fn write_answer_file(path: &Path, fleet: &VehicleRegistry, network: &RoadNetwork) -> IoResult<usize> {
    let written = write_answer(File::create(path)?, fleet, network)?;
    log::info!("wrote {written} routes to {}", path.display());
    Ok(written)
}
