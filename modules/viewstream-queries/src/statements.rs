//! Built-in ksqlDB statements for the viewing-activity analytics.
//!
//! Order matters: running queries are terminated and the old objects dropped
//! before the source stream and the two windowed tables are recreated.
//! `${KAFKA_TOPIC}` is the topic the producer writes to.

pub const TERMINATE_ALL: &str = "TERMINATE ALL;";

pub const DROP_DAILY_ENGAGEMENT: &str =
    "DROP TABLE IF EXISTS DAILY_ENGAGEMENT_METRICS DELETE TOPIC;";

pub const DROP_MOVIE_DURATION: &str = "DROP TABLE IF EXISTS MOVIE_DURATION_METRICS DELETE TOPIC;";

pub const DROP_ACTIVITY_STREAM: &str = "DROP STREAM IF EXISTS NETFLIX_ACTIVITY DELETE TOPIC;";

pub const CREATE_ACTIVITY_STREAM: &str = r#"
CREATE STREAM IF NOT EXISTS netflix_activity (
    USER_ID STRING,
    TIMESTAMP STRING,
    ACTIVITY_TYPE STRING,
    TITLE_ID STRING,
    DURATION INT,
    DEVICE_TYPE STRING,
    LOCATION STRING,
    TITLE STRING,
    GENRES STRING,
    RELEASE_DATE STRING,
    MOVIE_ID STRING
) WITH (
    KAFKA_TOPIC='${KAFKA_TOPIC}',
    PARTITIONS=6,
    REPLICAS=3,
    VALUE_FORMAT='AVRO',
    TIMESTAMP='TIMESTAMP',
    TIMESTAMP_FORMAT='yyyy-MM-dd HH:mm:ss'
);
"#;

pub const CREATE_MOVIE_DURATION_METRICS: &str = r#"
CREATE TABLE IF NOT EXISTS movie_duration_metrics WITH (
    KAFKA_TOPIC='netflix_movie_duration_metrics',
    PARTITIONS=6,
    REPLICAS=3,
    VALUE_FORMAT='JSON'
) AS
SELECT
    TITLE,
    COUNT(*) AS total_views,
    AVG(CAST(DURATION AS DOUBLE)) AS avg_duration,
    SUM(DURATION) AS total_duration,
    LATEST_BY_OFFSET(GENRES) AS genres,
    LATEST_BY_OFFSET(RELEASE_DATE) AS release_date,
    TIMESTAMPTOSTRING(WINDOWSTART, 'yyyy-MM-dd HH:mm:ss') AS window_start
FROM netflix_activity
WINDOW TUMBLING (SIZE 1 DAY)
WHERE DURATION IS NOT NULL
GROUP BY TITLE
EMIT CHANGES;
"#;

pub const CREATE_DAILY_ENGAGEMENT_METRICS: &str = r#"
CREATE TABLE IF NOT EXISTS daily_engagement_metrics WITH (
    KAFKA_TOPIC='netflix_daily_engagement_metrics',
    PARTITIONS=6,
    REPLICAS=3,
    VALUE_FORMAT='JSON'
) AS
SELECT
    TIMESTAMPTOSTRING(WINDOWSTART, 'yyyy-MM-dd') AS view_date,
    COUNT_DISTINCT(USER_ID) AS total_unique_users,
    COUNT(*) AS total_views,
    SUM(DURATION) AS total_watch_time,
    AVG(CAST(DURATION AS DOUBLE)) AS avg_watch_time,
    LATEST_BY_OFFSET(TITLE) AS most_watched_title,
    LATEST_BY_OFFSET(GENRES) AS most_watched_genre,
    TIMESTAMPTOSTRING(WINDOWSTART, 'HH') AS window_hour
FROM netflix_activity
WINDOW TUMBLING (SIZE 1 DAY)
WHERE DURATION IS NOT NULL
GROUP BY WINDOWSTART
EMIT CHANGES;
"#;

/// The full set, in execution order.
pub const BUILT_IN: [&str; 7] = [
    TERMINATE_ALL,
    DROP_DAILY_ENGAGEMENT,
    DROP_MOVIE_DURATION,
    DROP_ACTIVITY_STREAM,
    CREATE_ACTIVITY_STREAM,
    CREATE_MOVIE_DURATION_METRICS,
    CREATE_DAILY_ENGAGEMENT_METRICS,
];
