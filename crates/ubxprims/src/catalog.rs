//! Sample UBX message definitions.
//!
//! Device output messages and poll requests share class/id pairs, so they
//! live in two separate registries: [`output_registry`] for what a receiver
//! emits and [`poll_registry`] for what a host sends to request it.
//! Poll schemas carry a `-POLL` suffix so names stay unique across both.

use std::sync::Arc;

use ubxprims_frame::{MessageId, AID, CFG, LOG, MON, NAV, RXM};
use ubxprims_message::{FieldSpec, IntType, ListCount, MessageRegistry, MessageSchema, Result};

pub const NAV_POSECEF: MessageId = MessageId::new(NAV, 0x01);
pub const NAV_POSLLH: MessageId = MessageId::new(NAV, 0x02);
pub const NAV_DOP: MessageId = MessageId::new(NAV, 0x04);
pub const NAV_POSUTM: MessageId = MessageId::new(NAV, 0x08);
pub const NAV_SVINFO: MessageId = MessageId::new(NAV, 0x30);
pub const NAV_AOPSTATUS: MessageId = MessageId::new(NAV, 0x60);
pub const RXM_RAW: MessageId = MessageId::new(RXM, 0x10);
pub const RXM_ALM: MessageId = MessageId::new(RXM, 0x30);
pub const CFG_FXN: MessageId = MessageId::new(CFG, 0x0E);
pub const CFG_RXM: MessageId = MessageId::new(CFG, 0x11);
pub const CFG_USB: MessageId = MessageId::new(CFG, 0x1B);
pub const MON_IO: MessageId = MessageId::new(MON, 0x02);
pub const MON_VER: MessageId = MessageId::new(MON, 0x04);
pub const AID_INI: MessageId = MessageId::new(AID, 0x01);
pub const AID_AOP: MessageId = MessageId::new(AID, 0x33);
pub const LOG_RETRIEVE: MessageId = MessageId::new(LOG, 0x09);
pub const LOG_RETRIEVEPOS: MessageId = MessageId::new(LOG, 0x0B);

/// Geodetic position solution.
pub fn nav_posllh() -> Result<Arc<MessageSchema>> {
    MessageSchema::builder(NAV_POSLLH, "NAV-POSLLH")
        .field(FieldSpec::u32("iTOW").with_units("ms"))
        .field(FieldSpec::i32("lon").scaled(1, 10_000_000).with_units("deg"))
        .field(FieldSpec::i32("lat").scaled(1, 10_000_000).with_units("deg"))
        .field(FieldSpec::i32("height").scaled(1, 1000).with_units("m"))
        .field(FieldSpec::i32("hMSL").scaled(1, 1000).with_units("m"))
        .field(FieldSpec::u32("hAcc").scaled(1, 1000).with_units("m"))
        .field(FieldSpec::u32("vAcc").scaled(1, 1000).with_units("m"))
        .build_shared()
}

/// Space vehicle information, one block per tracking channel.
pub fn nav_svinfo() -> Result<Arc<MessageSchema>> {
    let channel = vec![
        FieldSpec::u8("chn"),
        FieldSpec::u8("svid"),
        FieldSpec::bitmask(
            "flags",
            IntType::U8,
            &[
                (0, "svUsed"),
                (1, "diffCorr"),
                (2, "orbitAvail"),
                (3, "orbitEph"),
                (4, "unhealthy"),
                (5, "orbitAlm"),
                (6, "orbitAop"),
                (7, "smoothed"),
            ],
        ),
        FieldSpec::u8("quality").with_range(0, 7),
        FieldSpec::u8("cno").with_units("dBHz"),
        FieldSpec::i8("elev").with_units("deg"),
        FieldSpec::i16("azim").with_units("deg"),
        FieldSpec::i32("prRes").scaled(1, 100).with_units("m"),
    ];

    MessageSchema::builder(NAV_SVINFO, "NAV-SVINFO")
        .field(FieldSpec::u32("iTOW").with_units("ms"))
        .field(FieldSpec::u8("numCh"))
        .field(FieldSpec::u8("globalFlags").with_range(0, 7))
        .field(FieldSpec::reserved("reserved2", 2))
        .field(FieldSpec::list("channels", channel, ListCount::field("numCh")))
        .build_shared()
}

/// Receiver and software version; extension strings fill the rest.
pub fn mon_ver() -> Result<Arc<MessageSchema>> {
    MessageSchema::builder(MON_VER, "MON-VER")
        .field(FieldSpec::bytes("swVersion", 30))
        .field(FieldSpec::bytes("hwVersion", 10))
        .field(FieldSpec::list(
            "extensions",
            vec![FieldSpec::bytes("extension", 30)],
            ListCount::Remaining,
        ))
        .build_shared()
}

/// Request log entries from the receiver's flash.
pub fn log_retrieve() -> Result<Arc<MessageSchema>> {
    MessageSchema::builder(LOG_RETRIEVE, "LOG-RETRIEVE")
        .field(FieldSpec::u32("startNumber"))
        .field(FieldSpec::u32("entryCount").with_range(0, 256))
        .field(FieldSpec::u8("version").with_range(0, 0))
        .field(FieldSpec::reserved("reserved1", 3))
        .build_shared()
}

/// Position fix read back from the log.
pub fn log_retrievepos() -> Result<Arc<MessageSchema>> {
    MessageSchema::builder(LOG_RETRIEVEPOS, "LOG-RETRIEVEPOS")
        .field(FieldSpec::u32("entryIndex"))
        .field(FieldSpec::i32("lon").scaled(1, 10_000_000).with_units("deg"))
        .field(FieldSpec::i32("lat").scaled(1, 10_000_000).with_units("deg"))
        .field(FieldSpec::i32("hMSL").scaled(1, 1000).with_units("m"))
        .field(FieldSpec::u32("hAcc").scaled(1, 1000).with_units("m"))
        .field(FieldSpec::u32("gSpeed").scaled(1, 1000).with_units("m/s"))
        .field(FieldSpec::u32("heading"))
        .field(FieldSpec::u8("version").with_range(0, 0))
        .field(FieldSpec::enumeration(
            "fixType",
            IntType::U8,
            &[(2, "2D-Fix"), (3, "3D-Fix")],
        ))
        .field(FieldSpec::u16("year"))
        .field(FieldSpec::u8("month").with_range(1, 12))
        .field(FieldSpec::u8("day").with_range(1, 31))
        .field(FieldSpec::u8("hour").with_range(0, 23))
        .field(FieldSpec::u8("minute").with_range(0, 59))
        .field(FieldSpec::u8("second").with_range(0, 60))
        .field(FieldSpec::reserved("reserved1", 1))
        .field(FieldSpec::u8("numSV"))
        .field(FieldSpec::reserved("reserved2", 1))
        .build_shared()
}

fn poll(id: MessageId, name: &str) -> Result<Arc<MessageSchema>> {
    MessageSchema::builder(id, format!("{name}-POLL"))
        .poll()
        .build_shared()
}

/// Poll AssistNow Autonomous data for one GPS satellite.
pub fn aid_aop_poll_sv() -> Result<Arc<MessageSchema>> {
    MessageSchema::builder(AID_AOP, "AID-AOP-POLL-SV")
        .poll()
        .field(FieldSpec::u8("svid").with_range(1, 32))
        .build_shared()
}

/// Every device output schema in the catalog.
pub fn output_schemas() -> Result<Vec<Arc<MessageSchema>>> {
    Ok(vec![
        nav_posllh()?,
        nav_svinfo()?,
        mon_ver()?,
        log_retrieve()?,
        log_retrievepos()?,
    ])
}

/// Every poll request schema in the catalog.
pub fn poll_schemas() -> Result<Vec<Arc<MessageSchema>>> {
    Ok(vec![
        poll(NAV_POSECEF, "NAV-POSECEF")?,
        poll(NAV_POSLLH, "NAV-POSLLH")?,
        poll(NAV_DOP, "NAV-DOP")?,
        poll(NAV_POSUTM, "NAV-POSUTM")?,
        poll(NAV_AOPSTATUS, "NAV-AOPSTATUS")?,
        poll(RXM_RAW, "RXM-RAW")?,
        poll(RXM_ALM, "RXM-ALM")?,
        poll(CFG_FXN, "CFG-FXN")?,
        poll(CFG_RXM, "CFG-RXM")?,
        poll(CFG_USB, "CFG-USB")?,
        poll(MON_IO, "MON-IO")?,
        poll(MON_VER, "MON-VER")?,
        poll(AID_INI, "AID-INI")?,
        aid_aop_poll_sv()?,
    ])
}

/// Registry of messages a receiver emits.
pub fn output_registry() -> Result<MessageRegistry> {
    MessageRegistry::from_schemas(output_schemas()?)
}

/// Registry of poll requests a host sends.
pub fn poll_registry() -> Result<MessageRegistry> {
    MessageRegistry::from_schemas(poll_schemas()?)
}

/// Look up any catalog schema by name, output messages first.
pub fn find(name: &str) -> Result<Option<Arc<MessageSchema>>> {
    let found = output_schemas()?
        .into_iter()
        .chain(poll_schemas()?)
        .find(|schema| schema.name().eq_ignore_ascii_case(name));
    Ok(found)
}
