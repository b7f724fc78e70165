pub use crate::error::{InflammationError, Result};
pub use crate::library::{attach_names, NamedSeries};
pub use crate::serializers::{
    Format, ObservationRecord, ObservationSerializer, PatientRecord, PatientSerializer,
    PatientStore, Serializer,
};
pub use crate::statistics::{patient_normalise, DailyStatistics};
pub use crate::table::{load_csv, TableBuilder};
pub use crate::{Day, Doctor, InflammationTable, Observation, Patient, Person};
