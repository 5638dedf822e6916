//! Shared test utilities for the casterix workspace.
//!
//! This crate provides programmatic fixture catalogs and wire-building
//! helpers shared across the crates' test suites. The fixtures are trimmed
//! renditions of real categories (CAT048 monoradar reports, CAT062 system
//! tracks, a pair of Mode-S BDS registers) with enough structural variety to
//! exercise every format kind: fixed, variable (single- and multi-part),
//! repetitive, compound, explicit, and BDS.

use casterix_core::{
    BDS_CATEGORY, BitsField, Catalog, Category, CategoryBuilder, Compound, CompoundChild,
    Encoding, Fixed, FormatNode, Rule, Uap, Variable,
};

/// A trimmed CAT048-style category (monoradar target reports).
///
/// UAP: 010, 140, 020, 070, 090, 130, 220 on the first FSPEC octet;
/// 240, 250, RE, 260 on the second.
pub fn cat048() -> Category {
    let mut builder = CategoryBuilder::new(48, "Monoradar Target Reports", "1.31");

    let dsi = builder.formats().fixed(
        2,
        vec![
            BitsField::new("SAC", 16, 9, Encoding::Unsigned).described("System Area Code"),
            BitsField::new("SIC", 8, 1, Encoding::Unsigned).described("System Identification Code"),
        ],
    );

    let time_of_day = builder.formats().fixed(
        3,
        vec![
            BitsField::new("TOD", 24, 1, Encoding::Unsigned)
                .described("Time of Day")
                .scaled(1.0 / 128.0, "s")
                .bounded(0.0, 86_400.0),
        ],
    );

    let descriptor_part = Fixed::new(
        1,
        vec![
            BitsField::new("TYP", 8, 6, Encoding::Unsigned)
                .described("Type of detection")
                .with_values([
                    (0, "No detection"),
                    (1, "Single PSR detection"),
                    (2, "Single SSR detection"),
                    (3, "SSR + PSR detection"),
                    (4, "Single ModeS All-Call"),
                    (5, "Single ModeS Roll-Call"),
                ]),
            BitsField::new("SIM", 5, 5, Encoding::Unsigned)
                .with_values([(0, "Actual target report"), (1, "Simulated target report")]),
            BitsField::new("RDP", 4, 4, Encoding::Unsigned),
            BitsField::new("SPI", 3, 3, Encoding::Unsigned),
            BitsField::new("RAB", 2, 2, Encoding::Unsigned),
            BitsField::fx_at(1),
        ],
    );
    let descriptor = builder
        .formats()
        .push(FormatNode::Variable(Variable::new(vec![descriptor_part])));

    let mode_3a = builder.formats().fixed(
        2,
        vec![
            BitsField::new("V", 16, 16, Encoding::Unsigned)
                .with_values([(0, "Code validated"), (1, "Code not validated")]),
            BitsField::new("G", 15, 15, Encoding::Unsigned),
            BitsField::new("L", 14, 14, Encoding::Unsigned),
            BitsField::new("spare", 13, 13, Encoding::Unsigned).constant(0),
            BitsField::new("MODE3A", 12, 1, Encoding::Octal).described("Mode-3/A reply code"),
        ],
    );

    let flight_level = builder.formats().fixed(
        2,
        vec![
            BitsField::new("V", 16, 16, Encoding::Unsigned),
            BitsField::new("G", 15, 15, Encoding::Unsigned),
            BitsField::new("FL", 14, 1, Encoding::Signed)
                .described("Flight Level")
                .scaled(0.25, "FL"),
        ],
    );

    let srl = builder.formats().fixed(
        1,
        vec![
            BitsField::new("SRL", 8, 1, Encoding::Unsigned)
                .described("SSR plot runlength")
                .scaled(360.0 / 8192.0, "deg"),
        ],
    );
    let srr = builder.formats().fixed(
        1,
        vec![
            BitsField::new("SRR", 8, 1, Encoding::Unsigned)
                .described("Number of received replies for MSSR"),
        ],
    );
    let sam = builder.formats().fixed(
        1,
        vec![
            BitsField::new("SAM", 8, 1, Encoding::Signed)
                .described("Amplitude of MSSR reply")
                .scaled(1.0, "dBm"),
        ],
    );
    let plot_characteristics = builder.formats().push(FormatNode::Compound(Compound {
        indicator: Variable::new(vec![Fixed::new(
            1,
            vec![
                BitsField::new("SRL_P", 8, 8, Encoding::Unsigned),
                BitsField::new("SRR_P", 7, 7, Encoding::Unsigned),
                BitsField::new("SAM_P", 6, 6, Encoding::Unsigned),
                BitsField::fx_at(1),
            ],
        )]),
        children: vec![
            CompoundChild {
                name: "SRL".into(),
                format: srl,
            },
            CompoundChild {
                name: "SRR".into(),
                format: srr,
            },
            CompoundChild {
                name: "SAM".into(),
                format: sam,
            },
        ],
    }));

    let aircraft_address = builder.formats().fixed(
        3,
        vec![BitsField::new("ADDR", 24, 1, Encoding::Hex).described("ICAO aircraft address")],
    );

    let aircraft_id = builder.formats().fixed(
        6,
        vec![
            BitsField::new("CALLSIGN", 48, 1, Encoding::SixBitAscii)
                .described("Aircraft identification"),
        ],
    );

    let bds_element = builder.formats().push(FormatNode::Bds { register: None });
    let mode_s_mb = builder.formats().push(FormatNode::Repetitive {
        element: bds_element,
    });

    let reserved_inner = builder
        .formats()
        .fixed(2, vec![BitsField::new("RFS", 16, 1, Encoding::Unsigned)]);
    let reserved = builder.formats().push(FormatNode::Explicit {
        element: reserved_inner,
    });

    // Pre-bound register: the seven wire bytes carry no id octet.
    let acas = builder.formats().push(FormatNode::Bds {
        register: Some(0x30),
    });

    builder.add_item(
        casterix_core::DataItemDescription::new("010", "Data Source Identifier", dsi)
            .with_rule(Rule::Mandatory)
            .with_definition(
                "Identification of the radar station from which the data is received.",
            ),
    );
    builder.item("140", "Time of Day", time_of_day);
    builder.item("020", "Target Report Descriptor", descriptor);
    builder.item("070", "Mode-3/A Code", mode_3a);
    builder.item("090", "Flight Level", flight_level);
    builder.item("130", "Radar Plot Characteristics", plot_characteristics);
    builder.item("220", "Aircraft Address", aircraft_address);
    builder.item("240", "Aircraft Identification", aircraft_id);
    builder.item("250", "Mode S MB Data", mode_s_mb);
    builder.item("RE", "Reserved Expansion Field", reserved);
    builder.item("260", "ACAS Resolution Advisory Report", acas);

    builder.uap(Uap::unconditional([
        Some("010"),
        Some("140"),
        Some("020"),
        Some("070"),
        Some("090"),
        Some("130"),
        Some("220"),
        Some("240"),
        Some("250"),
        Some("RE"),
        Some("260"),
    ]));

    builder.build().expect("cat048 fixture must validate")
}

/// A trimmed CAT062-style category (system track data).
///
/// UAP: 010, 015, 070, 105, 100, 185, 210 on the first FSPEC octet;
/// 060, 040, 080 on the second.
pub fn cat062() -> Category {
    let mut builder = CategoryBuilder::new(62, "System Track Data", "1.18");

    let dsi = builder.formats().fixed(
        2,
        vec![
            BitsField::new("SAC", 16, 9, Encoding::Unsigned),
            BitsField::new("SIC", 8, 1, Encoding::Unsigned),
        ],
    );
    let service_id = builder
        .formats()
        .fixed(1, vec![BitsField::new("SID", 8, 1, Encoding::Unsigned)]);
    let time_of_track = builder.formats().fixed(
        3,
        vec![BitsField::new("TOT", 24, 1, Encoding::Unsigned).scaled(1.0 / 128.0, "s")],
    );
    let wgs84 = builder.formats().fixed(
        8,
        vec![
            BitsField::new("LAT", 64, 33, Encoding::Signed)
                .described("Latitude in WGS-84")
                .scaled(180.0 / 33_554_432.0, "deg")
                .bounded(-90.0, 90.0),
            BitsField::new("LON", 32, 1, Encoding::Signed)
                .described("Longitude in WGS-84")
                .scaled(180.0 / 33_554_432.0, "deg")
                .bounded(-180.0, 180.0),
        ],
    );
    let cartesian = builder.formats().fixed(
        6,
        vec![
            BitsField::new("X", 48, 25, Encoding::Signed).scaled(0.5, "m"),
            BitsField::new("Y", 24, 1, Encoding::Signed).scaled(0.5, "m"),
        ],
    );
    let velocity = builder.formats().fixed(
        4,
        vec![
            BitsField::new("VX", 32, 17, Encoding::Signed).scaled(0.25, "m/s"),
            BitsField::new("VY", 16, 1, Encoding::Signed).scaled(0.25, "m/s"),
        ],
    );
    let acceleration = builder.formats().fixed(
        2,
        vec![
            BitsField::new("AX", 16, 9, Encoding::Signed).scaled(0.25, "m/s2"),
            BitsField::new("AY", 8, 1, Encoding::Signed).scaled(0.25, "m/s2"),
        ],
    );
    let mode_3a = builder.formats().fixed(
        2,
        vec![
            BitsField::new("V", 16, 16, Encoding::Unsigned),
            BitsField::new("G", 15, 15, Encoding::Unsigned),
            BitsField::new("CH", 14, 14, Encoding::Unsigned),
            BitsField::new("spare", 13, 13, Encoding::Unsigned).constant(0),
            BitsField::new("MODE3A", 12, 1, Encoding::Octal),
        ],
    );
    let track_number = builder
        .formats()
        .fixed(2, vec![BitsField::new("TRK", 16, 1, Encoding::Unsigned)]);

    let status_first = Fixed::new(
        1,
        vec![
            BitsField::new("MON", 8, 8, Encoding::Unsigned)
                .with_values([(0, "Multisensor track"), (1, "Monosensor track")]),
            BitsField::new("SPI", 7, 7, Encoding::Unsigned),
            BitsField::new("MRH", 6, 6, Encoding::Unsigned),
            BitsField::new("SRC", 5, 3, Encoding::Unsigned).with_values([
                (0, "No source"),
                (1, "GNSS"),
                (2, "3D radar"),
                (3, "Triangulation"),
            ]),
            BitsField::new("CNF", 2, 2, Encoding::Unsigned),
            BitsField::fx_at(1),
        ],
    );
    let status_second = Fixed::new(
        1,
        vec![
            BitsField::new("SIM", 8, 8, Encoding::Unsigned),
            BitsField::new("TSE", 7, 7, Encoding::Unsigned),
            BitsField::new("TSB", 6, 6, Encoding::Unsigned),
            BitsField::new("FPC", 5, 5, Encoding::Unsigned),
            BitsField::new("AFF", 4, 4, Encoding::Unsigned),
            BitsField::new("STP", 3, 3, Encoding::Unsigned),
            BitsField::new("KOS", 2, 2, Encoding::Unsigned),
            BitsField::fx_at(1),
        ],
    );
    let track_status = builder
        .formats()
        .push(FormatNode::Variable(Variable::new(vec![
            status_first,
            status_second,
        ])));

    builder.item("010", "Data Source Identifier", dsi);
    builder.item("015", "Service Identification", service_id);
    builder.item("070", "Time Of Track Information", time_of_track);
    builder.item("105", "Calculated Position In WGS-84 Co-ordinates", wgs84);
    builder.item("100", "Calculated Track Position (Cartesian)", cartesian);
    builder.item("185", "Calculated Track Velocity (Cartesian)", velocity);
    builder.item("210", "Calculated Acceleration (Cartesian)", acceleration);
    builder.item("060", "Track Mode 3/A Code", mode_3a);
    builder.item("040", "Track Number", track_number);
    builder.item("080", "Track Status", track_status);

    builder.uap(Uap::unconditional([
        Some("010"),
        Some("015"),
        Some("070"),
        Some("105"),
        Some("100"),
        Some("185"),
        Some("210"),
        Some("060"),
        Some("040"),
        Some("080"),
    ]));

    builder.build().expect("cat062 fixture must validate")
}

/// Mode-S registers in the BDS pseudo-category. Every register schema spans
/// the full seven-byte field: 40 and 60 are reached through an inline id
/// (their top octet is the register id itself), 30 is reached pre-bound
/// from CAT048/260 so all seven bytes are payload.
pub fn bds_registers() -> Category {
    let mut builder = CategoryBuilder::new(BDS_CATEGORY, "Mode S BDS Registers", "1.0");

    let bds30 = builder.formats().fixed(
        7,
        vec![
            BitsField::new("ARA", 56, 43, Encoding::Unsigned)
                .described("Active resolution advisories"),
            BitsField::new("RAC", 42, 39, Encoding::Unsigned)
                .described("Resolution advisory complement"),
            BitsField::new("RAT", 38, 38, Encoding::Unsigned),
            BitsField::new("MTE", 37, 37, Encoding::Unsigned),
        ],
    );
    let bds40 = builder.formats().fixed(
        7,
        vec![
            BitsField::new("BDS", 56, 49, Encoding::Hex).constant(0x40),
            BitsField::new("MCP_STATUS", 48, 48, Encoding::Unsigned),
            BitsField::new("MCP_ALT", 47, 36, Encoding::Unsigned)
                .described("MCP/FCU selected altitude")
                .scaled(16.0, "ft"),
        ],
    );
    let bds60 = builder.formats().fixed(
        7,
        vec![
            BitsField::new("BDS", 56, 49, Encoding::Hex).constant(0x60),
            BitsField::new("HDG_STATUS", 48, 48, Encoding::Unsigned),
            BitsField::new("MAG_HDG", 47, 37, Encoding::Signed)
                .described("Magnetic heading")
                .scaled(90.0 / 512.0, "deg"),
        ],
    );

    builder.item("30", "ACAS Resolution Advisory Report", bds30);
    builder.item("40", "Selected Vertical Intention", bds40);
    builder.item("60", "Heading and Speed Report", bds60);
    builder.uap(Uap::unconditional([Some("30"), Some("40"), Some("60")]));

    builder.build().expect("BDS fixture must validate")
}

/// The full fixture catalog: CAT048, CAT062, and the BDS registers.
pub fn catalog() -> Catalog {
    Catalog::new(vec![cat048(), cat062(), bds_registers()]).expect("fixture catalog must assemble")
}

/// Wraps a record payload into a data block with the correct LEN header.
pub fn data_block(category: u8, payload: &[u8]) -> Vec<u8> {
    let mut block = Vec::with_capacity(payload.len() + 3);
    block.push(category);
    block.extend_from_slice(&((payload.len() as u16 + 3).to_be_bytes()));
    block.extend_from_slice(payload);
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_validate() {
        let catalog = catalog();
        assert!(catalog.is_defined(48));
        assert!(catalog.is_defined(62));
        assert!(catalog.category(BDS_CATEGORY).is_some());
    }

    #[test]
    fn data_block_header() {
        let block = data_block(48, &[0x80, 0x12, 0x34]);
        assert_eq!(block, vec![0x30, 0x00, 0x06, 0x80, 0x12, 0x34]);
    }
}
