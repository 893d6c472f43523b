#![cfg(test)]

use example_driver::generated::object::object_selectors;
use example_driver::generated::volume_control::{
    volume_control_selectors as selectors, VolumeControlAccessors, VolumeControlProperties,
};
use example_driver::generated::{bridge, strings};
use example_driver::{install, VolumeDriver};
use propdispatch::*;
use std::sync::Arc;

fn volume_driver() -> (VolumeDriver, Arc<CollectingNotifier>) {
    let notifier = Arc::new(CollectingNotifier::new());
    let context = Context::builder().tracer(Arc::new(NoopTracer)).notifier(notifier.clone()).build();
    let installed = install(context, ValueRange::new(-96.0, 0.0)).expect("install failed");
    (installed, notifier)
}

fn output(selector: u32) -> PropertyAddress {
    PropertyAddress::new(selector, SCOPE_OUTPUT, ELEMENT_MAIN)
}

fn read_f32(d: &VolumeDriver, selector: u32, input: f32) -> (OsStatus, f32) {
    let mut out = input.to_ne_bytes();
    let status = bridge::get_property_data(
        d.driver.handle(),
        d.object_id,
        0,
        Some(&output(selector)),
        None,
        4,
        None,
        Some(&mut out),
    );
    (status, f32::from_ne_bytes(out))
}

fn write_f32(d: &VolumeDriver, selector: u32, value: f32) -> OsStatus {
    bridge::set_property_data(
        d.driver.handle(),
        d.object_id,
        0,
        Some(&output(selector)),
        None,
        4,
        Some(&value.to_ne_bytes()),
    )
}

#[test]
fn test_inherited_properties_through_the_bridge() {
    let (d, _) = volume_driver();
    let handle = d.driver.handle();

    assert!(bridge::has_property(handle, d.object_id, 0, Some(&output(selectors::SCALAR_VALUE))));
    assert!(bridge::has_property(handle, d.object_id, 0, Some(&output(object_selectors::CLASS))));
    assert!(!bridge::has_property(handle, d.object_id, 0, Some(&output(u32::from_be_bytes(*b"zzzz")))));

    let mut out = [0u8; 4];
    let status = bridge::get_property_data(
        handle,
        d.object_id,
        0,
        Some(&output(object_selectors::CLASS)),
        None,
        4,
        None,
        Some(&mut out),
    );
    assert_eq!(status, NO_ERROR);
    assert_eq!(u32::from_ne_bytes(out), u32::from_be_bytes(*b"vlme"));

    let mut size = 0;
    let status = bridge::get_property_data_size(
        handle,
        d.object_id,
        0,
        Some(&output(selectors::DECIBEL_RANGE)),
        None,
        Some(&mut size),
    );
    assert_eq!((status, size), (NO_ERROR, 16));
}

#[test]
fn test_decibel_and_scalar_stay_linked() {
    let (d, notifier) = volume_driver();

    assert_eq!(write_f32(&d, selectors::DECIBEL_VALUE, -48.0), NO_ERROR);
    assert_eq!(read_f32(&d, selectors::SCALAR_VALUE, 0.0), (NO_ERROR, 0.5));
    assert_eq!(
        notifier.take(),
        vec![(d.object_id, PropertyAddress::new(selectors::DECIBEL_VALUE, SCOPE_OUTPUT, ELEMENT_MAIN))]
    );

    assert_eq!(write_f32(&d, selectors::SCALAR_VALUE, 0.25), NO_ERROR);
    assert_eq!(read_f32(&d, selectors::DECIBEL_VALUE, 0.0), (NO_ERROR, -72.0));
}

#[test]
fn test_converters() {
    let (d, _) = volume_driver();

    assert_eq!(read_f32(&d, selectors::SCALAR_TO_DECIBELS, 0.75), (NO_ERROR, -24.0));
    assert_eq!(read_f32(&d, selectors::DECIBELS_TO_SCALAR, -24.0), (NO_ERROR, 0.75));

    // Converting does not touch the stored level
    assert_eq!(d.volume.get_scalar_value(), 1.0);
}

#[test]
fn test_validation_rejects_out_of_range() {
    let (d, notifier) = volume_driver();

    assert_eq!(write_f32(&d, selectors::SCALAR_VALUE, 2.0), ILLEGAL_OPERATION_ERROR);
    assert_eq!(write_f32(&d, selectors::DECIBEL_VALUE, 6.0), ILLEGAL_OPERATION_ERROR);
    assert_eq!(d.volume.get_scalar_value(), 1.0);
    assert!(notifier.is_empty());
}

#[test]
fn test_read_only_and_size_errors() {
    let (d, _) = volume_driver();
    let handle = d.driver.handle();

    // Not settable: falls through to the unknown-property answer
    assert_eq!(write_f32(&d, object_selectors::CLASS, 1.0), UNKNOWN_PROPERTY_ERROR);

    let status = bridge::set_property_data(
        handle,
        d.object_id,
        0,
        Some(&output(selectors::SCALAR_VALUE)),
        None,
        2,
        Some(&[0, 0]),
    );
    assert_eq!(status, BAD_PROPERTY_SIZE_ERROR);

    let mut settable = false;
    let status = bridge::is_property_settable(
        handle,
        d.object_id,
        0,
        Some(&output(selectors::DECIBEL_RANGE)),
        Some(&mut settable),
    );
    assert_eq!((status, settable), (NO_ERROR, false));
}

#[test]
fn test_unknown_driver_and_object() {
    let (d, _) = volume_driver();
    let address = output(selectors::SCALAR_VALUE);
    let mut size = 0;

    assert_eq!(
        bridge::get_property_data_size(DriverRef::NULL, d.object_id, 0, Some(&address), None, Some(&mut size)),
        UNSPECIFIED_ERROR
    );
    assert!(!bridge::has_property(DriverRef::NULL, d.object_id, 0, Some(&address)));

    assert_eq!(
        bridge::get_property_data_size(d.driver.handle(), 99, 0, Some(&address), None, Some(&mut size)),
        BAD_OBJECT_ERROR
    );
    assert!(!bridge::has_property(d.driver.handle(), 99, 0, Some(&address)));
    assert_eq!(size, 0);
}

#[test]
fn test_typed_wrappers() {
    let (d, _) = volume_driver();
    let object = d.driver.dispatcher().find_object(d.object_id).expect("registered");
    let object = object.as_any().downcast_ref::<PropertyObject>().expect("property object");

    object.set_decibel_value(-24.0).expect("set_decibel_value failed");
    assert_eq!(object.get_scalar_value(), Ok(0.75));
    assert_eq!(object.get_decibel_range(), Ok(ValueRange::new(-96.0, 0.0)));
}

#[test]
fn test_generated_strings() {
    assert_eq!(
        strings::property_selector_to_string(selectors::SCALAR_VALUE),
        "kAudioLevelControlPropertyScalarValue"
    );
    assert_eq!(strings::class_id_to_string(u32::from_be_bytes(*b"vlme")), "kAudioVolumeControlClassID");
    assert_eq!(strings::status_to_string(NO_ERROR), "OK");
    assert_eq!(strings::status_to_string(BAD_OBJECT_ERROR), "kAudioHardwareBadObjectError");
    assert_eq!(strings::class_id_to_string(u32::from_be_bytes(*b"zzzz")), "'zzzz' (0x7a7a7a7a)");
}

#[test]
fn test_dropping_the_driver_releases_the_control() {
    let (d, _) = volume_driver();
    let (handle, object_id) = (d.driver.handle(), d.object_id);
    let context = Arc::downgrade(d.driver.context());
    let volume = Arc::downgrade(&d.volume);

    drop(d);

    assert!(!bridge::has_property(handle, object_id, 0, Some(&output(selectors::SCALAR_VALUE))));
    assert!(context.upgrade().is_none());
    assert!(volume.upgrade().is_none());
}
