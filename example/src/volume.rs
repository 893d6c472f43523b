use crate::generated::{
    control::{control_schema, ControlAccessors, ControlHost, CONTROL_CLASS_NAME},
    object::{object_schema, ObjectAccessors, ObjectHost, OBJECT_CLASS_NAME},
    volume_control::{
        volume_control_schema, VolumeControlAccessors, VolumeControlHost, VOLUME_CONTROL_BASE_CLASS_ID,
        VOLUME_CONTROL_CLASS_ID, VOLUME_CONTROL_CLASS_NAME,
    },
};
use parking_lot::Mutex;
use propdispatch::compiler::SchemaError;
use propdispatch::*;
use std::sync::Arc;

/// Gain stage with a linear mapping between the scalar `0..=1` and the
/// decibel range.
pub struct VolumeControl {
    owner:   ObjectId,
    scope:   u32,
    element: u32,
    range:   ValueRange,
    scalar:  Mutex<f32>,
}

impl VolumeControl {
    pub fn new(owner: ObjectId, scope: u32, element: u32, range: ValueRange) -> Self {
        VolumeControl {
            owner,
            scope,
            element,
            range,
            scalar: Mutex::new(1.0),
        }
    }

    fn to_decibels(&self, scalar: f32) -> f32 {
        let (min, max) = (self.range.minimum as f32, self.range.maximum as f32);
        min + scalar.clamp(0.0, 1.0) * (max - min)
    }

    fn to_scalar(&self, decibels: f32) -> f32 {
        let (min, max) = (self.range.minimum as f32, self.range.maximum as f32);
        if max <= min {
            return 1.0;
        }
        ((decibels - min) / (max - min)).clamp(0.0, 1.0)
    }

    fn in_range(&self, decibels: f32) -> bool {
        let decibels = decibels as f64;
        decibels >= self.range.minimum && decibels <= self.range.maximum
    }
}

impl ObjectAccessors for VolumeControl {
    fn get_base_class(&self) -> u32 {
        VOLUME_CONTROL_BASE_CLASS_ID
    }

    fn get_class(&self) -> u32 {
        VOLUME_CONTROL_CLASS_ID
    }

    fn get_owner(&self) -> u32 {
        self.owner
    }

    fn get_owned_objects(&self) -> Vec<u32> {
        Vec::new()
    }
}

impl ControlAccessors for VolumeControl {
    fn get_scope(&self) -> u32 {
        self.scope
    }

    fn get_element(&self) -> u32 {
        self.element
    }
}

impl VolumeControlAccessors for VolumeControl {
    fn get_scalar_value(&self) -> f32 {
        *self.scalar.lock()
    }

    fn check_scalar_value(&self, value: &f32) -> Result<(), OsStatus> {
        if (0.0..=1.0).contains(value) {
            Ok(())
        } else {
            Err(ILLEGAL_OPERATION_ERROR)
        }
    }

    fn set_scalar_value_impl(&self, value: f32) -> Result<(), OsStatus> {
        *self.scalar.lock() = value;
        Ok(())
    }

    fn get_decibel_value(&self) -> f32 {
        self.to_decibels(self.get_scalar_value())
    }

    fn check_decibel_value(&self, value: &f32) -> Result<(), OsStatus> {
        if self.in_range(*value) {
            Ok(())
        } else {
            Err(ILLEGAL_OPERATION_ERROR)
        }
    }

    fn set_decibel_value_impl(&self, value: f32) -> Result<(), OsStatus> {
        *self.scalar.lock() = self.to_scalar(value);
        Ok(())
    }

    fn get_decibel_range(&self) -> ValueRange {
        self.range
    }

    fn convert_scalar_to_decibels(&self, input: f32) -> f32 {
        self.to_decibels(input)
    }

    fn convert_decibels_to_scalar(&self, input: f32) -> f32 {
        self.to_scalar(input)
    }
}

/// Dispatch tables of the three generated classes.
pub fn classes() -> Result<Arc<ClassTable>, SchemaError> {
    let schemas = vec![object_schema()?, control_schema()?, volume_control_schema()?];
    Ok(Arc::new(ClassTable::build(schemas)?))
}

/// A live driver with one registered volume control.
pub struct VolumeDriver {
    pub driver:    Arc<Driver>,
    pub volume:    Arc<VolumeControl>,
    pub object_id: ObjectId,
}

/// Registers a driver on `context` and a volume control owned by the plug-in
/// object, in the output scope on the main element.
pub fn install(context: Arc<Context>, range: ValueRange) -> Result<VolumeDriver, SchemaError> {
    let driver = Driver::new(context.clone());
    let object_id = driver.dispatcher().allocate_id();
    let volume = Arc::new(VolumeControl::new(PLUGIN_OBJECT_ID, SCOPE_OUTPUT, ELEMENT_MAIN, range));

    let object = ObjectBuilder::new(
        context,
        classes()?,
        VOLUME_CONTROL_CLASS_NAME,
        Arc::new(VolumeControlHost(volume.clone())),
    )
    .id(object_id)
    .scope(SCOPE_OUTPUT)
    .element(ELEMENT_MAIN)
    .class_host(CONTROL_CLASS_NAME, Arc::new(ControlHost(volume.clone())))
    .class_host(OBJECT_CLASS_NAME, Arc::new(ObjectHost(volume.clone())))
    .build()?;

    driver.dispatcher().register_object(Arc::new(object));
    tracing::info!(object_id, "installed volume control");

    Ok(VolumeDriver { driver, volume, object_id })
}
