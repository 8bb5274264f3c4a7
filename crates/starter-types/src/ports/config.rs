/// Environment keys the service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Secrets {
    Port,
    Host,
    Env,
    Origin,
    Credentials,
    RedisUrl,
    MongoHost,
    MongoPort,
    MongoUser,
    MongoPassword,
    MongoDatabase,
    DatabaseUrl,
    LogFormat,
}

impl Secrets {
    pub fn as_str(&self) -> &'static str {
        match self {
            Secrets::Port => "PORT",
            Secrets::Host => "HOST",
            Secrets::Env => "ENV",
            Secrets::Origin => "ORIGIN",
            Secrets::Credentials => "CREDENTIALS",
            Secrets::RedisUrl => "REDIS_URL",
            Secrets::MongoHost => "MONGO_HOST",
            Secrets::MongoPort => "MONGO_PORT",
            Secrets::MongoUser => "MONGO_USER",
            Secrets::MongoPassword => "MONGO_PASSWORD",
            Secrets::MongoDatabase => "MONGO_DATABASE",
            Secrets::DatabaseUrl => "DATABASE_URL",
            Secrets::LogFormat => "LOG_FORMAT",
        }
    }
}

impl AsRef<str> for Secrets {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not defined in environment variables")]
    Missing(String),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: String, value: String },
}
