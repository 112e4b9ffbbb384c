use crate::types::Channel;
use serde::{Deserialize, Serialize};

/// Source column name of the time base and of every logical channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelMap {
    pub time: String,
    pub target_decel: String,
    pub ego_speed: String,
    pub long_accel: String,
    pub lat_accel: String,
    pub throttle: String,
    pub yaw_rate: String,
    pub steer_angle: String,
    pub steer_rate: String,
    pub long_gap: String,
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self {
            time: "time".to_string(),
            target_decel: Channel::TargetDecel.name().to_string(),
            ego_speed: Channel::EgoSpeed.name().to_string(),
            long_accel: Channel::LongAccel.name().to_string(),
            lat_accel: Channel::LatAccel.name().to_string(),
            throttle: Channel::Throttle.name().to_string(),
            yaw_rate: Channel::YawRate.name().to_string(),
            steer_angle: Channel::SteerAngle.name().to_string(),
            steer_rate: Channel::SteerRate.name().to_string(),
            long_gap: Channel::LongGap.name().to_string(),
        }
    }
}

impl ChannelMap {
    pub fn column(&self, channel: Channel) -> &str {
        match channel {
            Channel::TargetDecel => &self.target_decel,
            Channel::EgoSpeed => &self.ego_speed,
            Channel::LongAccel => &self.long_accel,
            Channel::LatAccel => &self.lat_accel,
            Channel::Throttle => &self.throttle,
            Channel::YawRate => &self.yaw_rate,
            Channel::SteerAngle => &self.steer_angle,
            Channel::SteerRate => &self.steer_rate,
            Channel::LongGap => &self.long_gap,
        }
    }
}
