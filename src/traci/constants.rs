// TraCI command, variable and type identifiers used by this crate.

// Control commands
pub const CMD_GETVERSION: u8 = 0x00;
pub const CMD_SIMSTEP: u8 = 0x02;
pub const CMD_CLOSE: u8 = 0x7F;

// Domains
pub const CMD_GET_VEHICLE_VARIABLE: u8 = 0xa4;
pub const RESPONSE_GET_VEHICLE_VARIABLE: u8 = 0xb4;
pub const CMD_SET_VEHICLE_VARIABLE: u8 = 0xc4;
pub const CMD_GET_SIM_VARIABLE: u8 = 0xab;
pub const RESPONSE_GET_SIM_VARIABLE: u8 = 0xbb;

// Vehicle variables
pub const TRACI_ID_LIST: u8 = 0x00;
pub const VAR_SPEED: u8 = 0x40;
pub const VAR_POSITION: u8 = 0x42;
pub const VAR_LANE_ID: u8 = 0x51;
pub const CMD_SLOWDOWN: u8 = 0x14;

// Simulation variables
pub const VAR_TIME: u8 = 0x66;
pub const VAR_MIN_EXPECTED_VEHICLES: u8 = 0x7d;
pub const DISTANCE_REQUEST: u8 = 0x83;
pub const REQUEST_AIRDIST: u8 = 0x00;

// Data types
pub const POSITION_2D: u8 = 0x01;
pub const TYPE_UBYTE: u8 = 0x07;
pub const TYPE_INTEGER: u8 = 0x09;
pub const TYPE_DOUBLE: u8 = 0x0B;
pub const TYPE_STRING: u8 = 0x0C;
pub const TYPE_STRINGLIST: u8 = 0x0E;
pub const TYPE_COMPOUND: u8 = 0x0F;

// Result codes
pub const RTYPE_OK: u8 = 0x00;
pub const RTYPE_NOTIMPLEMENTED: u8 = 0x01;
pub const RTYPE_ERR: u8 = 0xFF;
