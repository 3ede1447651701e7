use anyhow::Result;
use std::{sync::Arc, time::Duration};
use strata_formats::{DataPacket, Failure, Message, Messages, Pick, Polarity, Text};
use strata_network::{
    Publisher, PublisherOptions, SessionError, Subscriber, SubscriberOptions,
};

/// bind a publisher on an ephemeral port and connect a subscriber to it
///
/// late joiners miss what was sent before the publisher accepted them, so
/// give the pair a beat to settle before the first send.
async fn start_pair(
    message_types: Messages,
    time_out: Option<Duration>,
) -> Result<(Publisher, Subscriber)> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut publisher_options = PublisherOptions::new();
    publisher_options.set_address("tcp://127.0.0.1:0")?;

    let publisher = Publisher::new();
    publisher.bind(&publisher_options).await?;

    let mut subscriber_options = SubscriberOptions::new();
    subscriber_options.set_address(&format!("tcp://{}", publisher.local_address()?))?;
    subscriber_options.set_message_types(message_types)?;
    subscriber_options.set_time_out(time_out);

    let subscriber = Subscriber::new();
    subscriber.connect(&subscriber_options).await?;

    tokio::time::sleep(Duration::from_millis(100)).await;

    Ok((publisher, subscriber))
}

fn all_kinds() -> Messages {
    let mut message_types = Messages::new();
    message_types.add(Box::new(Text::default())).unwrap();
    message_types.add(Box::new(Failure::default())).unwrap();
    message_types.add(Box::new(DataPacket::new())).unwrap();
    message_types.add(Box::new(Pick::new())).unwrap();
    message_types
}

fn data_packet() -> DataPacket {
    let mut packet = DataPacket::new();
    packet.set_network("WY").unwrap();
    packet.set_station("YFT").unwrap();
    packet.set_channel("EHZ").unwrap();
    packet.set_location_code("01").unwrap();
    packet.set_start_time_in_microseconds(1050);
    packet.set_sampling_rate(100.0).unwrap();
    packet.set_data(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
    packet
}

fn pick() -> Pick {
    let mut pick = Pick::new();
    pick.set_network("UU").unwrap();
    pick.set_station("FORK").unwrap();
    pick.set_channel("HHZ").unwrap();
    pick.set_location_code("01").unwrap();
    pick.set_time(1_628_803_598.25);
    pick.set_identifier(3_001);
    pick.set_polarity(Polarity::Up);
    pick.set_phase_hint("P");
    pick.set_algorithm("stalta");
    pick
}

#[tokio::test]
async fn every_kind_round_trips_through_the_wire() -> Result<()> {
    let (publisher, subscriber) = start_pair(all_kinds(), None).await?;

    let text = Text::new("station YFT back online");
    let failure = Failure::new("acquisition gap on channel EHZ");
    let packet = data_packet();
    let pick = pick();

    publisher.send(&text).await?;
    publisher.send(&failure).await?;
    publisher.send(&packet).await?;
    publisher.send(&pick).await?;

    let received = subscriber.receive().await?;
    assert_eq!(*received.into_any().downcast::<Text>().unwrap(), text);

    let received = subscriber.receive().await?;
    assert_eq!(
        *received.into_any().downcast::<Failure>().unwrap(),
        failure
    );

    let received = subscriber.receive().await?;
    let received = received.into_any().downcast::<DataPacket>().unwrap();
    assert_eq!(*received, packet);
    assert_eq!(received.end_time_in_microseconds(), 91_050);

    let received = subscriber.receive().await?;
    assert_eq!(*received.into_any().downcast::<Pick>().unwrap(), pick);

    publisher.close().await;
    subscriber.close().await;
    Ok(())
}

#[tokio::test]
async fn delivery_order_matches_send_order() -> Result<()> {
    let (publisher, subscriber) = start_pair(all_kinds(), None).await?;

    for index in 0..32 {
        publisher.send(&Text::new(format!("message {}", index))).await?;
    }

    for index in 0..32 {
        let received = subscriber.receive().await?;
        let received = received.into_any().downcast::<Text>().unwrap();
        assert_eq!(received.contents(), format!("message {}", index));
    }

    publisher.close().await;
    subscriber.close().await;
    Ok(())
}

#[tokio::test]
async fn unsubscribed_kinds_are_dropped_not_fatal() -> Result<()> {
    let mut text_only = Messages::new();
    text_only.add(Box::new(Text::default()))?;

    let (publisher, subscriber) = start_pair(text_only, None).await?;

    // the subscriber never registered picks: it must skip this one and
    // hand over the text that follows
    publisher.send(&pick()).await?;
    let text = Text::new("after the unknown kind");
    publisher.send(&text).await?;

    let received = subscriber.receive().await?;
    assert_eq!(*received.into_any().downcast::<Text>().unwrap(), text);

    publisher.close().await;
    subscriber.close().await;
    Ok(())
}

#[tokio::test]
async fn receive_times_out_and_the_session_stays_usable() -> Result<()> {
    let (publisher, subscriber) =
        start_pair(all_kinds(), Some(Duration::from_millis(50))).await?;

    let error = subscriber.receive().await.unwrap_err();
    assert!(matches!(error, SessionError::Timeout));

    // the time out did not tear the session down
    let text = Text::new("still alive");
    publisher.send(&text).await?;
    let received = subscriber.receive().await?;
    assert_eq!(*received.into_any().downcast::<Text>().unwrap(), text);

    publisher.close().await;
    subscriber.close().await;
    Ok(())
}

#[tokio::test]
async fn close_unblocks_a_pending_receive() -> Result<()> {
    let (publisher, subscriber) = start_pair(all_kinds(), None).await?;
    let subscriber = Arc::new(subscriber);

    let blocked = {
        let subscriber = subscriber.clone();
        tokio::spawn(async move { subscriber.receive().await })
    };

    // let the receive park on the empty inbox, then close underneath it
    tokio::time::sleep(Duration::from_millis(100)).await;
    let started = tokio::time::Instant::now();
    subscriber.close().await;

    let result = blocked.await?;
    assert!(matches!(result.unwrap_err(), SessionError::NotConnected));
    assert!(started.elapsed() < Duration::from_secs(2));

    publisher.close().await;
    Ok(())
}

#[tokio::test]
async fn closing_the_publisher_ends_a_blocked_receive() -> Result<()> {
    let (publisher, subscriber) = start_pair(all_kinds(), None).await?;

    publisher.close().await;

    let error = subscriber.receive().await.unwrap_err();
    assert!(matches!(error, SessionError::NotConnected));

    subscriber.close().await;
    Ok(())
}

#[tokio::test]
async fn the_session_keeps_its_own_registry_copy() -> Result<()> {
    let mut message_types = Messages::new();
    message_types.add(Box::new(Text::default()))?;

    let mut subscriber_options = SubscriberOptions::new();
    subscriber_options.set_message_types(message_types.clone())?;

    // growing the caller's registry after the fact must not widen what
    // the configured session accepts
    message_types.add(Box::new(Pick::new()))?;

    let mut publisher_options = PublisherOptions::new();
    publisher_options.set_address("tcp://127.0.0.1:0")?;
    let publisher = Publisher::new();
    publisher.bind(&publisher_options).await?;

    subscriber_options.set_address(&format!("tcp://{}", publisher.local_address()?))?;
    let subscriber = Subscriber::new();
    subscriber.connect(&subscriber_options).await?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    publisher.send(&pick()).await?;
    let text = Text::new("only text is subscribed");
    publisher.send(&text).await?;

    let received = subscriber.receive().await?;
    assert_eq!(*received.into_any().downcast::<Text>().unwrap(), text);

    publisher.close().await;
    subscriber.close().await;
    Ok(())
}

#[tokio::test]
async fn add_subscription_widens_a_live_session() -> Result<()> {
    let mut text_only = Messages::new();
    text_only.add(Box::new(Text::default()))?;

    let (publisher, subscriber) = start_pair(text_only, None).await?;

    subscriber.add_subscription(Box::new(Pick::new()))?;
    let duplicate = subscriber.add_subscription(Box::new(Pick::new()));
    assert!(matches!(
        duplicate.unwrap_err(),
        SessionError::Registry(_)
    ));

    let pick = pick();
    publisher.send(&pick).await?;
    let received = subscriber.receive().await?;
    assert_eq!(*received.into_any().downcast::<Pick>().unwrap(), pick);

    publisher.close().await;
    subscriber.close().await;
    Ok(())
}

#[tokio::test]
async fn two_subscribers_both_get_the_fan_out() -> Result<()> {
    let mut publisher_options = PublisherOptions::new();
    publisher_options.set_address("tcp://127.0.0.1:0")?;
    let publisher = Publisher::new();
    publisher.bind(&publisher_options).await?;

    let address = format!("tcp://{}", publisher.local_address()?);

    let mut first_options = SubscriberOptions::new();
    first_options.set_address(&address)?;
    first_options.set_message_types(all_kinds())?;
    let first = Subscriber::new();
    first.connect(&first_options).await?;

    let mut second_options = SubscriberOptions::new();
    second_options.set_address(&address)?;
    second_options.set_message_types(all_kinds())?;
    let second = Subscriber::new();
    second.connect(&second_options).await?;

    tokio::time::sleep(Duration::from_millis(100)).await;

    let text = Text::new("to everyone listening");
    publisher.send(&text).await?;

    let received = first.receive().await?;
    assert_eq!(*received.into_any().downcast::<Text>().unwrap(), text);
    let received = second.receive().await?;
    assert_eq!(*received.into_any().downcast::<Text>().unwrap(), text);

    publisher.close().await;
    first.close().await;
    second.close().await;
    Ok(())
}
