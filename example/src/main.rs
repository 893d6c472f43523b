// example/src/main.rs

use example_driver::generated::{bridge, strings, volume_control::volume_control_selectors as selectors};
use example_driver::install;
use propdispatch::compiler::SchemaError;
use propdispatch::*;

fn show(name: &str, status: OsStatus) {
    println!("{:<28} -> {}", name, strings::status_to_string(status));
}

fn main() -> Result<(), SchemaError> {
    tracing_subscriber::fmt().with_env_filter("debug").init();

    let context = Context::builder().tracer(std::sync::Arc::new(LogTracer::new(TraceStyle::Hierarchical))).build();
    let installed = install(context, ValueRange::new(-96.0, 0.0))?;
    let handle = installed.driver.handle();
    let id = installed.object_id;

    let scalar = PropertyAddress::new(selectors::SCALAR_VALUE, SCOPE_OUTPUT, ELEMENT_MAIN);
    let decibels = PropertyAddress::new(selectors::DECIBEL_VALUE, SCOPE_OUTPUT, ELEMENT_MAIN);
    let to_decibels = PropertyAddress::new(selectors::SCALAR_TO_DECIBELS, SCOPE_OUTPUT, ELEMENT_MAIN);

    println!(
        "{} on object {}: {}",
        strings::property_selector_to_string(scalar.selector),
        id,
        bridge::has_property(handle, id, 0, Some(&scalar))
    );

    // Set the level in decibels, read it back as a scalar
    let status = bridge::set_property_data(handle, id, 0, Some(&decibels), None, 4, Some(&(-48.0f32).to_ne_bytes()));
    show("SetPropertyData(DecibelValue)", status);

    let mut out = [0u8; 4];
    let mut size = 0;
    let status = bridge::get_property_data(handle, id, 0, Some(&scalar), None, 4, Some(&mut size), Some(&mut out));
    show("GetPropertyData(ScalarValue)", status);
    println!("scalar value = {}", f32::from_ne_bytes(out));

    // Converters take their input from the output buffer
    let mut out = 0.25f32.to_ne_bytes();
    let status = bridge::get_property_data(handle, id, 0, Some(&to_decibels), None, 4, Some(&mut size), Some(&mut out));
    show("GetPropertyData(ScalarToDb)", status);
    println!("0.25 = {} dB", f32::from_ne_bytes(out));

    // Out-of-range values are rejected by the validation hook
    let status = bridge::set_property_data(handle, id, 0, Some(&scalar), None, 4, Some(&2.0f32.to_ne_bytes()));
    show("SetPropertyData(2.0)", status);

    // Unknown objects and unknown handles
    show("GetPropertyDataSize(99)", bridge::get_property_data_size(handle, 99, 0, Some(&scalar), None, Some(&mut size)));
    show(
        "GetPropertyDataSize(NULL)",
        bridge::get_property_data_size(DriverRef::NULL, id, 0, Some(&scalar), None, Some(&mut size)),
    );

    Ok(())
}
