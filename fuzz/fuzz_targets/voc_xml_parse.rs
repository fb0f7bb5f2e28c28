//! Fuzz target for BCCD annotation parsing.
//!
//! Arbitrary bytes go through the VOC XML reader; anything other than an
//! `Ok` record or a `VocXmlParse` error is a bug.

#![no_main]

use bccdprep::ir::io_voc_xml::from_voc_xml_slice;
use bccdprep::BccdError;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    match from_voc_xml_slice(data) {
        Ok(record) => {
            assert!(record.width > 0 && record.height > 0);
            assert!(record.objects.iter().all(|object| object.bbox.is_finite()));
        }
        Err(BccdError::VocXmlParse { .. }) => {}
        Err(other) => panic!("unexpected error kind: {other}"),
    }
});
